use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use signsense::csv_loader::load_hands_from_csv;
use signsense::gesture_classifier::GestureClassifier;

struct ReplayOptions {
    dump_fingers: bool,
}

fn parse_args() -> Result<(PathBuf, ReplayOptions)> {
    let mut dump_fingers = false;
    let mut csv_path: Option<PathBuf> = None;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--dump-fingers" => dump_fingers = true,
            _ => {
                if csv_path.is_some() {
                    bail!("Uso: replay_csv [--dump-fingers] <archivo.csv>");
                }
                csv_path = Some(PathBuf::from(arg));
            }
        }
    }

    let csv_path = csv_path.ok_or_else(|| anyhow!("Debes especificar un archivo CSV"))?;
    Ok((csv_path, ReplayOptions { dump_fingers }))
}

fn main() -> Result<()> {
    let (csv_path, opts) = parse_args()?;
    println!("🎞️  Reproduciendo captura desde {:?}", csv_path);

    let hands = load_hands_from_csv(&csv_path)?;
    println!("ℹ️  {} cuadros cargados\n", hands.len());

    let classifier = GestureClassifier::new();

    for (idx, hand) in hands.iter().enumerate() {
        if opts.dump_fingers {
            // Estado de dedos como máscara (pulgar→meñique), 1 = extendido
            let fingers = classifier.fingers_up(hand);
            let marks: String = fingers.iter().map(|&f| if f { '1' } else { '0' }).collect();
            println!(
                "  [{:03}] {:<22} dedos={}",
                idx,
                classifier.caption(hand),
                marks
            );
        } else {
            println!("  [{:03}] {}", idx, classifier.caption(hand));
        }
    }

    let (gesture, share) = classifier
        .vote_across_frames(&hands)
        .ok_or_else(|| anyhow!("La captura no contiene cuadros"))?;

    println!(
        "\n🥇 Gesto dominante: {} ({:.1}% de los cuadros)",
        gesture,
        share * 100.0
    );

    Ok(())
}
