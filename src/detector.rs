use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};

use crossbeam_channel::Sender;
use serde::Deserialize;
use thiserror::Error;

use crate::types::{DetectedHand, DetectionFrame, Landmark, NUM_LANDMARKS};

/// Opciones del modelo de landmarks externo. Se configuran una sola vez al
/// lanzar el ayudante y no cambian durante la sesión.
#[derive(Debug, Clone, Copy)]
pub struct DetectorConfig {
    /// Máximo de manos a detectar por cuadro
    pub max_num_hands: usize,
    /// Confianza mínima; detecciones por debajo se suprimen
    pub min_detection_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_num_hands: 1,
            min_detection_confidence: 0.7,
        }
    }
}

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("No se pudo lanzar el detector externo: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Error de E/S con el detector: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON inválido del detector: {0}")]
    Json(#[from] serde_json::Error),

    #[error("El detector no señaló READY (recibido: {0:?})")]
    NotReady(String),

    #[error("Falta {0} del detector")]
    MissingStream(&'static str),
}

// Estructuras espejo del protocolo JSON por línea del ayudante
#[derive(Debug, Deserialize)]
struct LandmarkJson {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Deserialize)]
struct HandJson {
    score: f32,
    landmarks: Vec<LandmarkJson>,
}

#[derive(Debug, Deserialize)]
struct FrameJson {
    frame: u64,
    width: u32,
    height: u32,
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Decodifica una línea del protocolo a un cuadro de detecciones.
///
/// Aplica las dos opciones fijas del detector: descarta manos por debajo de
/// la confianza mínima y recorta al máximo de manos. Una mano con un número
/// de landmarks distinto de 21 viola el contrato del ayudante y se descarta
/// aquí, en la frontera; el clasificador nunca valida.
pub fn decode_frame(line: &str, config: &DetectorConfig) -> Result<DetectionFrame, DetectorError> {
    let parsed: FrameJson = serde_json::from_str(line)?;

    if let Some(msg) = parsed.error {
        eprintln!("⚠️  Detector reportó error en frame {}: {}", parsed.frame, msg);
        return Ok(DetectionFrame {
            frame_id: parsed.frame,
            width: parsed.width,
            height: parsed.height,
            hands: Vec::new(),
        });
    }

    let hands: Vec<DetectedHand> = parsed
        .hands
        .iter()
        .filter(|hand| hand.score >= config.min_detection_confidence)
        .filter_map(convert_hand)
        .take(config.max_num_hands)
        .collect();

    Ok(DetectionFrame {
        frame_id: parsed.frame,
        width: parsed.width,
        height: parsed.height,
        hands,
    })
}

fn convert_hand(hand: &HandJson) -> Option<DetectedHand> {
    if hand.landmarks.len() != NUM_LANDMARKS {
        eprintln!(
            "⚠️  Mano descartada: se esperaban {} landmarks, llegaron {}",
            NUM_LANDMARKS,
            hand.landmarks.len()
        );
        return None;
    }

    let mut landmarks = [Landmark::default(); NUM_LANDMARKS];
    for (i, lm) in hand.landmarks.iter().enumerate() {
        landmarks[i] = Landmark::new(lm.x, lm.y, lm.z);
    }

    Some(DetectedHand {
        landmarks,
        score: hand.score,
    })
}

/// Lanza el ayudante de detección y reenvía sus cuadros por el canal.
///
/// El ayudante es el colaborador externo que posee la cámara y el modelo de
/// landmarks: tras imprimir `READY` emite un objeto JSON por línea y por
/// cuadro (`{"frame": n, "width": w, "height": h, "hands": [...]}`). EOF en
/// su stdout significa fin de la transmisión (cámara cerrada) y no es un
/// error. Pensado para correr en un hilo propio, como el receptor del
/// canal de entrada.
pub fn run_detector_stream(
    command: &[String],
    config: DetectorConfig,
    tx: Sender<DetectionFrame>,
) -> Result<(), DetectorError> {
    let (program, extra_args) = command
        .split_first()
        .ok_or(DetectorError::MissingStream("comando"))?;

    let mut child: Child = Command::new(program)
        .args(extra_args)
        .arg("--max-hands")
        .arg(config.max_num_hands.to_string())
        .arg("--min-confidence")
        .arg(config.min_detection_confidence.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(DetectorError::Spawn)?;

    let stdout = child
        .stdout
        .take()
        .ok_or(DetectorError::MissingStream("stdout"))?;
    let mut reader = BufReader::new(stdout);

    // Esperar el saludo READY antes de aceptar cuadros
    let mut ready_line = String::new();
    reader.read_line(&mut ready_line)?;
    if ready_line.trim() != "READY" {
        let _ = child.kill();
        return Err(DetectorError::NotReady(ready_line.trim().to_string()));
    }

    println!("✅ Detector externo listo");

    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader.read_line(&mut line)?;
        if bytes == 0 {
            // Fin de la transmisión: la cámara se cerró
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let frame = decode_frame(trimmed, &config)?;
        if tx.send(frame).is_err() {
            // El consumidor terminó; no queda nadie escuchando
            break;
        }
    }

    let _ = child.kill();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_hand_json(score: f32) -> String {
        let landmarks: Vec<String> = (0..NUM_LANDMARKS)
            .map(|i| format!(r#"{{"x":0.{:02},"y":0.5,"z":0.0}}"#, i + 10))
            .collect();
        format!(
            r#"{{"score":{},"landmarks":[{}]}}"#,
            score,
            landmarks.join(",")
        )
    }

    #[test]
    fn test_decode_single_hand() {
        let config = DetectorConfig::default();
        let line = format!(
            r#"{{"frame":7,"width":640,"height":480,"hands":[{}]}}"#,
            sample_hand_json(0.93)
        );

        let frame = decode_frame(&line, &config).unwrap();
        assert_eq!(frame.frame_id, 7);
        assert_eq!((frame.width, frame.height), (640, 480));
        assert_eq!(frame.hands.len(), 1);
        assert!((frame.hands[0].score - 0.93).abs() < 1e-6);
        assert!((frame.hands[0].landmarks[0].x - 0.10).abs() < 1e-6);
    }

    #[test]
    fn test_decode_empty_frame() {
        let config = DetectorConfig::default();
        let line = r#"{"frame":1,"width":640,"height":480,"hands":[]}"#;

        let frame = decode_frame(line, &config).unwrap();
        assert!(frame.hands.is_empty());
    }

    #[test]
    fn test_low_confidence_suppressed() {
        let config = DetectorConfig::default(); // umbral 0.7
        let line = format!(
            r#"{{"frame":2,"width":640,"height":480,"hands":[{}]}}"#,
            sample_hand_json(0.42)
        );

        let frame = decode_frame(&line, &config).unwrap();
        assert!(frame.hands.is_empty());
    }

    #[test]
    fn test_max_hands_truncates() {
        let config = DetectorConfig {
            max_num_hands: 1,
            min_detection_confidence: 0.5,
        };
        let line = format!(
            r#"{{"frame":3,"width":640,"height":480,"hands":[{},{}]}}"#,
            sample_hand_json(0.9),
            sample_hand_json(0.8)
        );

        let frame = decode_frame(&line, &config).unwrap();
        assert_eq!(frame.hands.len(), 1);
        assert!((frame.hands[0].score - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_short_hand_dropped_at_boundary() {
        let config = DetectorConfig::default();
        // Solo 2 landmarks: violación de contrato, se descarta la mano
        let line = r#"{"frame":4,"width":640,"height":480,"hands":[{"score":0.9,"landmarks":[{"x":0.1,"y":0.2,"z":0.0},{"x":0.3,"y":0.4,"z":0.0}]}]}"#;

        let frame = decode_frame(line, &config).unwrap();
        assert!(frame.hands.is_empty());
    }

    #[test]
    fn test_helper_error_yields_empty_frame() {
        let config = DetectorConfig::default();
        let line = r#"{"frame":5,"width":640,"height":480,"error":"camera busy"}"#;

        let frame = decode_frame(line, &config).unwrap();
        assert!(frame.hands.is_empty());
    }

    #[test]
    fn test_malformed_line_is_an_error() {
        let config = DetectorConfig::default();
        assert!(decode_frame("esto no es json", &config).is_err());
    }
}
