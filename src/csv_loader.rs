use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, ensure, Context, Result};
use csv::ReaderBuilder;

use crate::types::{HandLandmarkSet, Landmark, NUM_LANDMARKS};

/// Carga una captura de landmarks desde un CSV en el formato
/// frame,landmark,x,y,z con una mano por cuadro.
///
/// Cada cuadro debe traer sus 21 landmarks y la numeración de cuadros debe
/// ser contigua desde 0: una captura se escribe entera o no se escribe.
pub fn load_hands_from_csv(path: impl AsRef<Path>) -> Result<Vec<HandLandmarkSet>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("No se pudo abrir el CSV {:?}", path))?;

    let mut frames: BTreeMap<usize, [Option<Landmark>; NUM_LANDMARKS]> = BTreeMap::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record =
            result.with_context(|| format!("Fila {} inválida en {:?}", row_idx + 1, path))?;
        if record.len() < 5 {
            bail!("La fila {} no tiene 5 columnas", row_idx + 1);
        }

        let frame: usize = record[0]
            .parse()
            .with_context(|| format!("frame inválido en fila {}", row_idx + 1))?;
        let landmark: usize = record[1]
            .parse()
            .with_context(|| format!("landmark inválido en fila {}", row_idx + 1))?;

        if landmark >= NUM_LANDMARKS {
            bail!("Landmark {} fuera de rango (fila {})", landmark, row_idx + 1);
        }

        let x: f32 = record[2].parse()?;
        let y: f32 = record[3].parse()?;
        let z: f32 = record[4].parse()?;

        frames.entry(frame).or_insert([None; NUM_LANDMARKS])[landmark] =
            Some(Landmark::new(x, y, z));
    }

    if frames.is_empty() {
        return Err(anyhow!("El CSV {:?} no contiene datos", path));
    }

    let (&min_frame, _) = frames.iter().next().unwrap();
    ensure!(
        min_frame == 0,
        "El CSV debe iniciar en frame=0 (encontrado frame={})",
        min_frame
    );
    let max_frame = *frames.keys().max().unwrap();
    ensure!(
        frames.len() == max_frame + 1,
        "Captura no contigua: faltan cuadros entre 0 y {}",
        max_frame
    );

    let mut hands = Vec::with_capacity(frames.len());
    for (frame_idx, slots) in frames {
        let mut hand = [Landmark::default(); NUM_LANDMARKS];
        for (i, slot) in slots.into_iter().enumerate() {
            hand[i] = slot
                .ok_or_else(|| anyhow!("Cuadro {} incompleto: falta el landmark {}", frame_idx, i))?;
        }
        hands.push(hand);
    }

    Ok(hands)
}

/// Graba capturas de landmarks a CSV, un archivo numerado por sesión.
/// Escribe incrementalmente: cada mano empujada queda en disco al momento.
pub struct LandmarkRecorder {
    file: File,
    path: PathBuf,
    next_frame: usize,
}

impl LandmarkRecorder {
    /// Crea el directorio de salida si no existe y abre el siguiente
    /// archivo libre con el patrón `{prefix}_{:05}.csv`
    pub fn create(out_dir: impl AsRef<Path>, prefix: &str) -> Result<Self> {
        let out_dir = out_dir.as_ref();
        fs::create_dir_all(out_dir)
            .with_context(|| format!("No se pudo crear el directorio {:?}", out_dir))?;

        let mut file_idx = 0u32;
        let path = loop {
            let candidate = out_dir.join(format!("{}_{:05}.csv", prefix, file_idx));
            if !candidate.exists() {
                break candidate;
            }
            file_idx += 1;
        };

        let mut file = File::create(&path)
            .with_context(|| format!("No se pudo crear el CSV {:?}", path))?;
        writeln!(file, "frame,landmark,x,y,z")?;

        Ok(Self {
            file,
            path,
            next_frame: 0,
        })
    }

    /// Añade los 21 landmarks de una mano como el siguiente cuadro
    pub fn push(&mut self, hand: &HandLandmarkSet) -> Result<()> {
        for (i, lm) in hand.iter().enumerate() {
            writeln!(self.file, "{},{},{},{},{}", self.next_frame, i, lm.x, lm.y, lm.z)?;
        }
        self.next_frame += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> usize {
        self.next_frame
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
