use crate::types::{
    FingerState, Gesture, HandLandmarkSet, HandSide, INDEX_MCP, INDEX_PIP, INDEX_TIP, MIDDLE_PIP,
    MIDDLE_TIP, NUM_FINGERS, PINKY_PIP, PINKY_TIP, RING_PIP, RING_TIP, THUMB_MCP, THUMB_TIP, WRIST,
};

/// Distancia máxima pulgar-índice (plano x,y normalizado) para el gesto OK.
/// El umbral está en unidades de imagen normalizada (5% de la escala del
/// cuadro), así que depende de la resolución y de la distancia de la mano a
/// la cámara. Limitación conocida del original; se conserva tal cual.
pub const OK_MAX_THUMB_INDEX_DIST: f32 = 0.05;

/// Pares (punta, articulación PIP) de los cuatro dedos no-pulgar,
/// en el orden índice, medio, anular, meñique
const TIP_PIP_PAIRS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_PIP),
    (MIDDLE_TIP, MIDDLE_PIP),
    (RING_TIP, RING_PIP),
    (PINKY_TIP, PINKY_PIP),
];

/// Clasificador geométrico de gestos: funciones puras sobre los 21 puntos
/// de una mano. Sin estado entre cuadros; cada detección se evalúa sola.
pub struct GestureClassifier {
    ok_max_dist: f32,
}

impl GestureClassifier {
    pub fn new() -> Self {
        Self {
            ok_max_dist: OK_MAX_THUMB_INDEX_DIST,
        }
    }

    /// Aproxima el lado de la mano comparando muñeca contra MCP del índice.
    /// Solo es válido con el cuadro espejado horizontalmente (vista de
    /// espejo); con la mano rotada la línea muñeca-MCP deja de ser
    /// horizontal y el resultado puede ser incorrecto. Siempre devuelve
    /// un valor.
    pub fn handedness(&self, hand: &HandLandmarkSet) -> HandSide {
        if hand[WRIST].x < hand[INDEX_MCP].x {
            HandSide::Right
        } else {
            HandSide::Left
        }
    }

    /// Estado extendido/recogido de los 5 dedos.
    /// Función pura y determinista de los 21 puntos de entrada.
    pub fn fingers_up(&self, hand: &HandLandmarkSet) -> FingerState {
        let mut fingers = [false; NUM_FINGERS];

        // El eje de flexión del pulgar es horizontal y su dirección
        // "extendida" se invierte con el lado de la mano
        fingers[0] = match self.handedness(hand) {
            HandSide::Right => hand[THUMB_TIP].x < hand[THUMB_MCP].x,
            HandSide::Left => hand[THUMB_TIP].x > hand[THUMB_MCP].x,
        };

        // Los otros dedos apuntan hacia arriba al extenderse e y crece
        // hacia abajo: punta por encima de su PIP = extendido
        for (i, (tip, pip)) in TIP_PIP_PAIRS.iter().enumerate() {
            fingers[i + 1] = hand[*tip].y < hand[*pip].y;
        }

        fingers
    }

    /// Clasifica la configuración de dedos en un gesto.
    ///
    /// Las reglas se evalúan en orden fijo y cada una reasigna el resultado
    /// sin condicionar a las anteriores: la última que coincide gana.
    /// Ese orden (conteo → OK → THUMBS UP → SUPER) viene del original y se
    /// conserva tal cual, incluidos los empates sintéticos.
    pub fn recognize_gesture(&self, hand: &HandLandmarkSet) -> Gesture {
        let fingers = self.fingers_up(hand);
        let count = fingers.iter().filter(|&&f| f).count() as u8;

        let mut gesture = Gesture::from_count(count);

        // OK: pinza pulgar-índice cerrada con medio, anular y meñique
        // extendidos. Comparación estricta (< umbral).
        let pinch_dist = hand[THUMB_TIP].dist_2d(&hand[INDEX_TIP]);
        if pinch_dist < self.ok_max_dist && fingers[2] && fingers[3] && fingers[4] {
            gesture = Gesture::Ok;
        }

        // THUMBS UP: solo el pulgar extendido y su punta por encima
        // de la muñeca
        if fingers == [true, false, false, false, false] && hand[THUMB_TIP].y < hand[WRIST].y {
            gesture = Gesture::ThumbsUp;
        }

        // SUPER: índice y medio extendidos, el resto recogido
        if fingers == [false, true, true, false, false] {
            gesture = Gesture::Super;
        }

        gesture
    }

    /// Texto superpuesto para una mano: `"<Left Hand|Right Hand>: <gesto>"`
    pub fn caption(&self, hand: &HandLandmarkSet) -> String {
        format!(
            "{}: {}",
            self.handedness(hand).label(),
            self.recognize_gesture(hand)
        )
    }

    /// Votación entre los cuadros de una captura: gesto más frecuente y su
    /// fracción de votos. Herramienta de reproducción offline; el bucle en
    /// vivo clasifica cada cuadro por separado, sin memoria entre cuadros.
    pub fn vote_across_frames(&self, hands: &[HandLandmarkSet]) -> Option<(Gesture, f32)> {
        if hands.is_empty() {
            return None;
        }

        let mut votes: Vec<(Gesture, usize)> = Vec::new();
        for hand in hands {
            let gesture = self.recognize_gesture(hand);
            match votes.iter_mut().find(|(label, _)| *label == gesture) {
                Some((_, count)) => *count += 1,
                None => votes.push((gesture, 1)),
            }
        }

        let total = hands.len() as f32;
        let (winner, count) = votes.into_iter().max_by_key(|&(_, count)| count)?;
        Some((winner, count as f32 / total))
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Landmark, NUM_LANDMARKS};

    /// Mano derecha sintética (vista espejada: muñeca a la izquierda del
    /// MCP del índice) con el patrón de dedos pedido
    fn synthetic_hand(fingers: FingerState) -> HandLandmarkSet {
        let mut hand = [Landmark::default(); NUM_LANDMARKS];
        hand[WRIST] = Landmark::new(0.30, 0.60, 0.0);
        hand[THUMB_MCP] = Landmark::new(0.35, 0.55, 0.0);
        hand[INDEX_MCP] = Landmark::new(0.50, 0.50, 0.0);

        // Pulgar extendido = punta a la izquierda de su MCP (mano derecha)
        let thumb_x = if fingers[0] { 0.25 } else { 0.45 };
        hand[THUMB_TIP] = Landmark::new(thumb_x, 0.50, 0.0);

        for (i, (tip, pip)) in TIP_PIP_PAIRS.iter().enumerate() {
            let x = 0.52 + 0.06 * i as f32;
            hand[*pip] = Landmark::new(x, 0.40, 0.0);
            let tip_y = if fingers[i + 1] { 0.30 } else { 0.50 };
            hand[*tip] = Landmark::new(x, tip_y, 0.0);
        }

        hand
    }

    #[test]
    fn test_fingers_up_matches_requested_pattern() {
        let classifier = GestureClassifier::new();
        for pattern in [
            [false, false, false, false, false],
            [true, false, false, false, false],
            [false, true, true, false, false],
            [true, true, true, true, true],
        ] {
            let hand = synthetic_hand(pattern);
            assert_eq!(classifier.fingers_up(&hand), pattern);
        }
    }

    #[test]
    fn test_deterministic_output() {
        let classifier = GestureClassifier::new();
        let hand = synthetic_hand([true, true, false, true, false]);

        // La misma entrada produce exactamente la misma salida
        assert_eq!(classifier.fingers_up(&hand), classifier.fingers_up(&hand));
        assert_eq!(
            classifier.recognize_gesture(&hand),
            classifier.recognize_gesture(&hand)
        );
    }

    #[test]
    fn test_handedness_from_wrist_and_index_mcp() {
        let classifier = GestureClassifier::new();

        let right = synthetic_hand([false; 5]);
        assert_eq!(classifier.handedness(&right), HandSide::Right);

        // Muñeca a la derecha del MCP del índice → mano izquierda
        let mut left = right;
        left[WRIST].x = 0.70;
        assert_eq!(classifier.handedness(&left), HandSide::Left);
    }

    #[test]
    fn test_handedness_flips_thumb_comparison() {
        let classifier = GestureClassifier::new();

        // Punta del pulgar a la izquierda de su MCP: extendido como mano
        // derecha, recogido como mano izquierda, el resto de puntos fijo
        let mut hand = synthetic_hand([true, false, false, false, false]);
        assert!(classifier.fingers_up(&hand)[0]);

        hand[WRIST].x = 0.70; // ahora wrist.x > index_mcp.x → izquierda
        assert!(!classifier.fingers_up(&hand)[0]);
    }

    #[test]
    fn test_fist() {
        let classifier = GestureClassifier::new();
        let hand = synthetic_hand([false; 5]);

        assert_eq!(classifier.fingers_up(&hand), [false; 5]);
        assert_eq!(classifier.recognize_gesture(&hand), Gesture::Fist);
    }

    #[test]
    fn test_count_labels() {
        let classifier = GestureClassifier::new();

        // Índice + medio + anular, pulgar y meñique recogidos
        let hand = synthetic_hand([false, true, true, true, false]);
        assert_eq!(classifier.recognize_gesture(&hand), Gesture::Three);

        let hand = synthetic_hand([true, true, true, true, true]);
        assert_eq!(classifier.recognize_gesture(&hand), Gesture::Five);
    }

    #[test]
    fn test_thumbs_up() {
        let classifier = GestureClassifier::new();

        let mut hand = synthetic_hand([true, false, false, false, false]);
        hand[THUMB_TIP].y = 0.20; // punta del pulgar por encima de la muñeca (0.60)
        assert_eq!(classifier.recognize_gesture(&hand), Gesture::ThumbsUp);
    }

    #[test]
    fn test_thumb_below_wrist_stays_count() {
        let classifier = GestureClassifier::new();

        // Mismo patrón (1,0,0,0,0) pero con la punta del pulgar por debajo
        // de la muñeca: no es THUMBS UP, queda la etiqueta de conteo
        let mut hand = synthetic_hand([true, false, false, false, false]);
        hand[THUMB_TIP].y = 0.70;
        assert_eq!(classifier.recognize_gesture(&hand), Gesture::One);
    }

    #[test]
    fn test_ok_pinch() {
        let classifier = GestureClassifier::new();

        // Medio, anular y meñique extendidos; pinza pulgar-índice cerrada
        // con los valores del caso de referencia: distancia ≈ 0.028
        let mut hand = synthetic_hand([false, false, true, true, true]);
        hand[THUMB_TIP] = Landmark::new(0.40, 0.50, 0.0);
        hand[INDEX_TIP] = Landmark::new(0.42, 0.52, 0.0);
        assert_eq!(classifier.recognize_gesture(&hand), Gesture::Ok);
    }

    #[test]
    fn test_ok_distance_boundary_is_strict() {
        let classifier = GestureClassifier::new();

        let mut hand = synthetic_hand([false, false, true, true, true]);

        // Distancia exactamente igual al umbral: NO es OK (comparación
        // estricta). Se construye restando contra 0.0 para que el delta
        // sea el umbral bit a bit.
        hand[THUMB_TIP] = Landmark::new(0.0, 0.45, 0.0);
        hand[INDEX_TIP] = Landmark::new(OK_MAX_THUMB_INDEX_DIST, 0.45, 0.0);
        assert_ne!(classifier.recognize_gesture(&hand), Gesture::Ok);

        // Ligeramente por debajo del umbral: sí es OK
        hand[INDEX_TIP].x = 0.0499;
        assert_eq!(classifier.recognize_gesture(&hand), Gesture::Ok);
    }

    #[test]
    fn test_ok_requires_three_raised_fingers() {
        let classifier = GestureClassifier::new();

        // Pinza cerrada pero con el anular recogido: no hay OK
        let mut hand = synthetic_hand([false, false, true, false, true]);
        hand[THUMB_TIP] = Landmark::new(0.40, 0.50, 0.0);
        hand[INDEX_TIP] = Landmark::new(0.42, 0.52, 0.0);
        assert_ne!(classifier.recognize_gesture(&hand), Gesture::Ok);
    }

    #[test]
    fn test_super_pattern() {
        let classifier = GestureClassifier::new();

        let hand = synthetic_hand([false, true, true, false, false]);
        assert_eq!(classifier.recognize_gesture(&hand), Gesture::Super);
    }

    #[test]
    fn test_super_wins_over_earlier_rules() {
        let classifier = GestureClassifier::new();

        // Patrón SUPER con la pinza pulgar-índice cerrada: SUPER se evalúa
        // al final y sobreescribe cualquier asignación previa
        let mut hand = synthetic_hand([false, true, true, false, false]);
        hand[THUMB_TIP] = Landmark::new(0.52, 0.31, 0.0);
        assert!(hand[THUMB_TIP].dist_2d(&hand[INDEX_TIP]) < OK_MAX_THUMB_INDEX_DIST);
        assert_eq!(classifier.recognize_gesture(&hand), Gesture::Super);
    }

    #[test]
    fn test_unmatched_pattern_falls_back_to_count() {
        let classifier = GestureClassifier::new();

        // (1,1,0,0,0) con la pinza bien abierta: ninguna regla especial
        // coincide y queda la etiqueta de conteo
        let hand = synthetic_hand([true, true, false, false, false]);
        assert!(hand[THUMB_TIP].dist_2d(&hand[INDEX_TIP]) > 0.2);
        assert_eq!(classifier.recognize_gesture(&hand), Gesture::Two);
    }

    #[test]
    fn test_vote_across_frames() {
        let classifier = GestureClassifier::new();

        let fist = synthetic_hand([false; 5]);
        let five = synthetic_hand([true; 5]);

        let (gesture, share) = classifier
            .vote_across_frames(&[fist, fist, five])
            .unwrap();
        assert_eq!(gesture, Gesture::Fist);
        assert!((share - 2.0 / 3.0).abs() < 1e-6);

        assert!(classifier.vote_across_frames(&[]).is_none());
    }

    #[test]
    fn test_caption_format() {
        let classifier = GestureClassifier::new();

        let hand = synthetic_hand([false; 5]);
        assert_eq!(classifier.caption(&hand), "Right Hand: FIST");

        let mut hand = synthetic_hand([false, true, true, false, false]);
        hand[WRIST].x = 0.70;
        // Con la mano izquierda la comparación del pulgar se invierte:
        // mantenerlo recogido exige punta a la izquierda de su MCP
        hand[THUMB_TIP].x = 0.30;
        assert_eq!(classifier.caption(&hand), "Left Hand: SUPER");
    }
}
