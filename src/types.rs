use std::fmt;

/// Número de puntos que entrega el modelo de landmarks por mano
pub const NUM_LANDMARKS: usize = 21;
/// Dedos de una mano: pulgar, índice, medio, anular, meñique
pub const NUM_FINGERS: usize = 5;

// Índices anatómicos fijos según la convención del modelo de landmarks.
// El clasificador nunca los reordena ni los valida.
pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Grafo de conexiones del esqueleto de la mano, para visualización.
/// Cada par es (origen, destino) en índices de landmark.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC),
    (THUMB_CMC, THUMB_MCP),
    (THUMB_MCP, THUMB_IP),
    (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP),
    (INDEX_MCP, INDEX_PIP),
    (INDEX_PIP, INDEX_DIP),
    (INDEX_DIP, INDEX_TIP),
    (WRIST, MIDDLE_MCP),
    (MIDDLE_MCP, MIDDLE_PIP),
    (MIDDLE_PIP, MIDDLE_DIP),
    (MIDDLE_DIP, MIDDLE_TIP),
    (WRIST, RING_MCP),
    (RING_MCP, RING_PIP),
    (RING_PIP, RING_DIP),
    (RING_DIP, RING_TIP),
    (WRIST, PINKY_MCP),
    (PINKY_MCP, PINKY_PIP),
    (PINKY_PIP, PINKY_DIP),
    (PINKY_DIP, PINKY_TIP),
    (INDEX_MCP, MIDDLE_MCP),
];

/// Un punto de la mano en coordenadas normalizadas a la imagen:
/// x,y en [0,1] con origen arriba-izquierda e y creciendo hacia abajo.
/// z es profundidad relativa y no participa en la clasificación.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Distancia euclídea en el plano (x, y); z se ignora
    pub fn dist_2d(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Los 21 puntos de una mano detectada, en el orden anatómico fijo
pub type HandLandmarkSet = [Landmark; NUM_LANDMARKS];

/// Estado extendido/recogido por dedo: (pulgar, índice, medio, anular, meñique)
pub type FingerState = [bool; NUM_FINGERS];

/// Lado de la mano, aproximado geométricamente cuadro a cuadro.
/// No hay seguimiento entre cuadros: cada detección es independiente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    /// Etiqueta para el texto superpuesto
    pub fn label(&self) -> &'static str {
        match self {
            HandSide::Left => "Left Hand",
            HandSide::Right => "Right Hand",
        }
    }
}

impl fmt::Display for HandSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Vocabulario cerrado de gestos reconocidos.
/// `Count(n)` es la rama de respaldo para conteos fuera de 0..=6;
/// con 5 dedos nunca se alcanza, pero la tabla original la contempla.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Fist,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Ok,
    ThumbsUp,
    Super,
    Count(u8),
}

impl Gesture {
    /// Etiqueta base según el número de dedos extendidos
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Gesture::Fist,
            1 => Gesture::One,
            2 => Gesture::Two,
            3 => Gesture::Three,
            4 => Gesture::Four,
            5 => Gesture::Five,
            6 => Gesture::Six,
            n => Gesture::Count(n),
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gesture::Fist => f.write_str("FIST"),
            Gesture::One => f.write_str("ONE"),
            Gesture::Two => f.write_str("TWO"),
            Gesture::Three => f.write_str("THREE"),
            Gesture::Four => f.write_str("FOUR"),
            Gesture::Five => f.write_str("FIVE"),
            Gesture::Six => f.write_str("SIX"),
            Gesture::Ok => f.write_str("OK"),
            Gesture::ThumbsUp => f.write_str("THUMBS UP"),
            Gesture::Super => f.write_str("SUPER"),
            Gesture::Count(n) => write!(f, "{}", n),
        }
    }
}

/// Una mano entregada por el detector: sus 21 puntos más la confianza
#[derive(Debug, Clone, Copy)]
pub struct DetectedHand {
    pub landmarks: HandLandmarkSet,
    pub score: f32,
}

/// Resultado completo de un cuadro de video: cero o más manos,
/// en el orden en que el detector las entregó
#[derive(Debug, Clone, Default)]
pub struct DetectionFrame {
    pub frame_id: u64,
    pub width: u32,
    pub height: u32,
    pub hands: Vec<DetectedHand>,
}
