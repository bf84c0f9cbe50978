use anyhow::Result;

use crate::types::{DetectionFrame, HandLandmarkSet, HAND_CONNECTIONS};

/// Ancla fija del texto superpuesto, en píxeles sobre el cuadro
pub const TEXT_ANCHOR: (i32, i32) = (30, 60);

/// Segmento del esqueleto en coordenadas de píxel: (origen, destino)
pub type Segment = ((f32, f32), (f32, f32));

/// Superposición lista para dibujar sobre una mano detectada
#[derive(Debug, Clone)]
pub struct HandOverlay {
    /// Texto `"<Left Hand|Right Hand>: <gesto>"`
    pub caption: String,
    /// Posición del texto en el cuadro
    pub anchor: (i32, i32),
    /// Esqueleto de la mano proyectado a píxeles
    pub segments: Vec<Segment>,
}

/// Proyecta el grafo de conexiones de la mano a segmentos en píxeles
pub fn skeleton_segments(hand: &HandLandmarkSet, width: u32, height: u32) -> Vec<Segment> {
    let (w, h) = (width as f32, height as f32);
    HAND_CONNECTIONS
        .iter()
        .map(|&(a, b)| {
            (
                (hand[a].x * w, hand[a].y * h),
                (hand[b].x * w, hand[b].y * h),
            )
        })
        .collect()
}

/// Colaborador de salida: recibe cada cuadro con sus superposiciones ya
/// calculadas. Una lista vacía significa que no se detectó ninguna mano en
/// ese cuadro y no se dibuja nada.
pub trait OverlaySink {
    fn draw(&mut self, frame: &DetectionFrame, overlays: &[HandOverlay]) -> Result<()>;
}

/// Salida por consola: imprime las leyendas como líneas de estado.
/// Un renderizador real (ventana de video) se conecta detrás del mismo trait.
pub struct ConsoleOverlay;

impl OverlaySink for ConsoleOverlay {
    fn draw(&mut self, frame: &DetectionFrame, overlays: &[HandOverlay]) -> Result<()> {
        for overlay in overlays {
            println!("[FRAME {:05}] {}", frame.frame_id, overlay.caption);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Landmark, NUM_LANDMARKS, WRIST};

    #[test]
    fn test_skeleton_scales_to_pixels() {
        let mut hand = [Landmark::new(0.5, 0.5, 0.0); NUM_LANDMARKS];
        hand[WRIST] = Landmark::new(0.25, 0.75, 0.0);

        let segments = skeleton_segments(&hand, 640, 480);
        assert_eq!(segments.len(), HAND_CONNECTIONS.len());

        // La primera conexión parte de la muñeca: (0.25, 0.75) → (160, 360)
        let ((x0, y0), _) = segments[0];
        assert!((x0 - 160.0).abs() < 1e-3);
        assert!((y0 - 360.0).abs() < 1e-3);
    }
}
