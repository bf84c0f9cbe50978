/*
Finger Count & Gesture Recognition - Rust Puro

Sistema de reconocimiento de gestos de mano que:
1. Recibe landmarks de mano por cuadro desde un ayudante externo
   (el ayudante posee la cámara y el modelo de pose, p. ej. MediaPipe)
2. Clasifica la configuración de dedos con reglas geométricas puras
3. Superpone "<Left Hand|Right Hand>: <gesto>" sobre cada cuadro

Protocolo del ayudante: imprime READY en stdout y después un objeto JSON
por línea y por cuadro:
  {"frame": 0, "width": 640, "height": 480,
   "hands": [{"score": 0.93, "landmarks": [{"x": ..., "y": ..., "z": ...} x21]}]}
EOF en stdout = cámara cerrada = fin de la transmisión.

Para compilar y ejecutar:
    ./target/release/signsense python3 hand_stream.py
    ./target/release/signsense --record capturas/fist python3 hand_stream.py

Para debug con teclado (reproduce capturas CSV):
    sg input -c './target/debug/signsense'
*/

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossbeam_channel::bounded;

use signsense::csv_loader::{load_hands_from_csv, LandmarkRecorder};
use signsense::detector::{run_detector_stream, DetectorConfig};
use signsense::gesture_classifier::GestureClassifier;
use signsense::overlay::{ConsoleOverlay, HandOverlay, OverlaySink};
use signsense::pipeline::run_loop;
use signsense::types::DetectionFrame;

/// Sumidero que además graba a CSV la primera mano de cada cuadro
struct RecordingOverlay<S> {
    inner: S,
    recorder: LandmarkRecorder,
}

impl<S: OverlaySink> OverlaySink for RecordingOverlay<S> {
    fn draw(&mut self, frame: &DetectionFrame, overlays: &[HandOverlay]) -> Result<()> {
        if let Some(hand) = frame.hands.first() {
            self.recorder.push(&hand.landmarks)?;
        }
        self.inner.draw(frame, overlays)
    }
}

fn main() -> Result<()> {
    println!("🖐️  Finger Count & Gesture Recognition - Rust\n");

    // Argumentos: [--record <dir>] <comando del ayudante...>
    let mut record_dir: Option<PathBuf> = None;
    let mut helper_cmd: Vec<String> = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if helper_cmd.is_empty() && arg == "--record" {
            let dir = args
                .next()
                .ok_or_else(|| anyhow!("--record requiere un directorio"))?;
            record_dir = Some(PathBuf::from(dir));
        } else {
            helper_cmd.push(arg);
        }
    }

    if helper_cmd.is_empty() {
        println!("🔧 Modo: DEBUG - Teclado Interactivo\n");
        return debug_mode();
    }

    println!("🔧 Modo: Video en Tiempo Real");
    println!("🎯 Ayudante: {}\n", helper_cmd.join(" "));

    // El ayudante corre en un hilo propio y entrega cuadros por el canal;
    // las dos opciones del detector quedan fijadas aquí, una sola vez
    let config = DetectorConfig::default();
    let (tx, rx) = bounded::<DetectionFrame>(100);

    let helper = helper_cmd.clone();
    std::thread::spawn(move || {
        if let Err(e) = run_detector_stream(&helper, config, tx) {
            eprintln!("❌ Error en el detector: {}", e);
        }
    });

    let classifier = GestureClassifier::new();
    println!("✅ Clasificador geométrico listo");

    // Hilo de control de usuario: 'q' envía la señal de salida
    let (tx_quit, rx_quit) = bounded::<()>(1);
    std::thread::spawn(move || watch_quit_key(tx_quit));

    println!("🎬 Iniciando reconocimiento en tiempo real...\n");

    let processed = match record_dir {
        Some(dir) => {
            let recorder = LandmarkRecorder::create(&dir, "captura")?;
            println!("💾 Grabando landmarks en {:?}", recorder.path());

            let mut sink = RecordingOverlay {
                inner: ConsoleOverlay,
                recorder,
            };
            let n = run_loop(&rx, &rx_quit, &classifier, &mut sink)?;
            println!(
                "💾 Captura guardada: {} cuadros en {:?}",
                sink.recorder.frames_written(),
                sink.recorder.path()
            );
            n
        }
        None => {
            let mut sink = ConsoleOverlay;
            run_loop(&rx, &rx_quit, &classifier, &mut sink)?
        }
    };

    println!("\n👋 Fin de la transmisión: {} cuadros procesados", processed);
    Ok(())
}

/// Busca un teclado físico en /dev/input
fn find_keyboard() -> Option<evdev::Device> {
    use evdev::Device;

    for entry in fs::read_dir("/dev/input").ok()? {
        if let Ok(entry) = entry {
            let path = entry.path();
            if let Some(name) = path.file_name() {
                if name.to_string_lossy().starts_with("event") {
                    if let Ok(device) = Device::open(&path) {
                        if let Some(dev_name) = device.name() {
                            let dev_name_lc = dev_name.to_lowercase();
                            if dev_name_lc.contains("keyboard")
                                || dev_name_lc.contains("at translated")
                            {
                                println!(
                                    "✅ Teclado encontrado: {} ({})",
                                    dev_name,
                                    path.display()
                                );
                                return Some(device);
                            }
                        }
                    }
                }
            }
        }
    }

    None
}

/// Hilo de control: una pulsación de 'q' envía la señal de salida.
/// La señal se consume una vez por iteración del bucle de cuadros.
fn watch_quit_key(tx_quit: crossbeam_channel::Sender<()>) {
    use evdev::{InputEventKind, Key};

    let mut device = match find_keyboard() {
        Some(device) => device,
        None => {
            eprintln!("⚠️  Sin teclado accesible: termina cerrando la cámara del ayudante");
            return;
        }
    };

    println!("⌨️  Presiona 'q' para salir");

    loop {
        match device.fetch_events() {
            Ok(events) => {
                for ev in events {
                    if let InputEventKind::Key(key) = ev.kind() {
                        if ev.value() == 1 && key == Key::KEY_Q {
                            let _ = tx_quit.send(());
                            return;
                        }
                    }
                }
            }
            Err(_) => return,
        }

        std::thread::sleep(Duration::from_millis(10));
    }
}

/// Modo DEBUG: lee teclas globales y reproduce capturas CSV grabadas
fn debug_mode() -> Result<()> {
    use evdev::{InputEventKind, Key};
    use rand::Rng;

    println!("🔍 Buscando teclado...");

    let mut device = find_keyboard().ok_or_else(|| {
        anyhow!("No se encontró ningún dispositivo de teclado en /dev/input")
    })?;

    println!("✅ Captura de teclado global activada\n");

    let classifier = GestureClassifier::new();
    println!("✅ Clasificador geométrico listo\n");

    println!("Presiona teclas para reproducir capturas:");
    println!("  f → capturas/fist");
    println!("  o → capturas/ok");
    println!("  t → capturas/thumbs-up");
    println!("  s → capturas/super");
    println!("  v → capturas/five");
    println!("  q → salir\n");

    let key_to_folder: HashMap<Key, (&str, &str)> = [
        (Key::KEY_F, ("capturas/fist", "f")),
        (Key::KEY_O, ("capturas/ok", "o")),
        (Key::KEY_T, ("capturas/thumbs-up", "t")),
        (Key::KEY_S, ("capturas/super", "s")),
        (Key::KEY_V, ("capturas/five", "v")),
    ]
    .iter()
    .cloned()
    .collect();

    println!("🎧 Escuchando teclas globales...\n");

    loop {
        for ev in device.fetch_events()? {
            if let InputEventKind::Key(key) = ev.kind() {
                if ev.value() == 1 {
                    if key == Key::KEY_Q {
                        println!("\n👋 Saliendo...");
                        return Ok(());
                    }

                    if let Some((folder_name, key_char)) = key_to_folder.get(&key) {
                        println!("\n🔑 Tecla presionada: '{}'", key_char);
                        println!("📂 Buscando CSV en: {}/", folder_name);

                        let folder_path = PathBuf::from(folder_name);

                        if !folder_path.exists() {
                            eprintln!("❌ Carpeta no existe: {}", folder_name);
                            continue;
                        }

                        let csv_files: Vec<PathBuf> = fs::read_dir(&folder_path)?
                            .filter_map(|entry| entry.ok())
                            .map(|entry| entry.path())
                            .filter(|path| {
                                path.extension()
                                    .and_then(|ext| ext.to_str())
                                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                                    .unwrap_or(false)
                            })
                            .collect();

                        if csv_files.is_empty() {
                            eprintln!("❌ No hay archivos CSV en {}", folder_name);
                            continue;
                        }

                        let random_idx = rand::thread_rng().gen_range(0..csv_files.len());
                        let csv_path = &csv_files[random_idx];
                        let file_name = csv_path
                            .file_name()
                            .and_then(|n| n.to_str())
                            .unwrap_or("unknown.csv");

                        println!("📄 Archivo: {}", file_name);

                        match load_hands_from_csv(csv_path) {
                            Ok(hands) => match classifier.vote_across_frames(&hands) {
                                Some((gesture, share)) => {
                                    println!(
                                        "🎯 Gesto dominante: {} ({:.1}% de {} cuadros)",
                                        gesture,
                                        share * 100.0,
                                        hands.len()
                                    );
                                }
                                None => println!("⚠️  Captura vacía"),
                            },
                            Err(e) => eprintln!("❌ Error cargando CSV: {}", e),
                        }
                    }
                }
            }
        }

        std::thread::sleep(Duration::from_millis(10));
    }
}
