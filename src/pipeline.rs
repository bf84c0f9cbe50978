use anyhow::Result;
use crossbeam_channel::{select, Receiver};

use crate::gesture_classifier::GestureClassifier;
use crate::overlay::{skeleton_segments, HandOverlay, OverlaySink, TEXT_ANCHOR};
use crate::types::DetectionFrame;

/// Construye las superposiciones de un cuadro: para cada mano detectada,
/// en el orden en que el detector la entregó, lado + gesto + esqueleto.
/// Cada mano se procesa por separado, sin interacción entre manos.
pub fn annotate_frame(
    classifier: &GestureClassifier,
    frame: &DetectionFrame,
) -> Vec<HandOverlay> {
    frame
        .hands
        .iter()
        .map(|hand| HandOverlay {
            caption: classifier.caption(&hand.landmarks),
            anchor: TEXT_ANCHOR,
            segments: skeleton_segments(&hand.landmarks, frame.width, frame.height),
        })
        .collect()
}

/// Bucle por cuadro: recibir → clasificar → dibujar, hasta fin de la
/// transmisión o señal de salida. Sin estado compartido entre cuadros y sin
/// reintentos: un cuadro sin manos se dibuja vacío y se continúa; un canal
/// cerrado termina el bucle con limpieza.
///
/// Devuelve el número de cuadros procesados.
pub fn run_loop<S: OverlaySink>(
    rx_frames: &Receiver<DetectionFrame>,
    rx_quit: &Receiver<()>,
    classifier: &GestureClassifier,
    sink: &mut S,
) -> Result<u64> {
    let mut frames_processed = 0u64;

    loop {
        // La señal de salida se consulta una vez por iteración; si compite
        // con un cuadro pendiente, gana la salida
        if rx_quit.try_recv().is_ok() {
            break;
        }

        select! {
            recv(rx_quit) -> _ => break,
            recv(rx_frames) -> msg => match msg {
                Ok(frame) => {
                    let overlays = annotate_frame(classifier, &frame);
                    sink.draw(&frame, &overlays)?;
                    frames_processed += 1;
                }
                // Canal cerrado: no hay más cuadros (fin de la transmisión)
                Err(_) => break,
            },
        }
    }

    Ok(frames_processed)
}
