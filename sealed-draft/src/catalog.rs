// Card catalog loading.
//
// Reads the master card pool from a JSON array or a CSV file with the columns
// id, fullName, color, cost, rarity, image. Shape validation is the catalog
// publisher's job; rows are only parsed here.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::draft::card::{Card, Color, Rarity};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("unsupported catalog format for {path} (expected .json or .csv)")]
    UnsupportedFormat { path: String },

    #[error("catalog {path} contains no usable cards")]
    Empty { path: String },
}

// ---------------------------------------------------------------------------
// Raw record
// ---------------------------------------------------------------------------

/// One catalog row as published. Color and rarity stay strings until mapped
/// onto the closed enums. Ids are kept verbatim, so `007` stays `007`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCard {
    id: String,
    full_name: String,
    color: String,
    #[serde(default)]
    cost: Option<u8>,
    #[serde(default)]
    rarity: Option<String>,
    #[serde(default, alias = "imageUrl")]
    image: Option<String>,
}

impl RawCard {
    /// Map onto a `Card`. Unknown colors drop the row; unknown rarities are
    /// kept as unranked.
    fn into_card(self) -> Option<Card> {
        let Some(color) = Color::from_label(&self.color) else {
            warn!(
                "skipping card '{}': unknown color '{}'",
                self.full_name.trim(),
                self.color
            );
            return None;
        };
        let rarity = self
            .rarity
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .and_then(|label| {
                let parsed = Rarity::from_label(label);
                if parsed.is_none() {
                    warn!("card '{}': unranked rarity '{}'", self.full_name.trim(), label);
                }
                parsed
            });
        Some(Card {
            id: self.id.trim().to_string(),
            full_name: self.full_name.trim().to_string(),
            color,
            cost: self.cost,
            rarity,
            image: self.image.filter(|s| !s.trim().is_empty()),
        })
    }
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

fn load_csv_from_reader<R: Read>(rdr: R) -> Result<Vec<Card>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut cards = Vec::new();
    for result in reader.deserialize::<RawCard>() {
        match result {
            Ok(raw) => cards.extend(raw.into_card()),
            Err(e) => warn!("skipping malformed catalog row: {}", e),
        }
    }
    Ok(cards)
}

fn load_json_from_reader<R: Read>(rdr: R) -> Result<Vec<Card>, serde_json::Error> {
    let rows: Vec<serde_json::Value> = serde_json::from_reader(rdr)?;
    let mut cards = Vec::new();
    for mut row in rows {
        // Some JSON exports publish ids as numbers.
        if let Some(id) = row.get_mut("id").filter(|id| id.is_number()) {
            *id = serde_json::Value::String(id.to_string());
        }
        match serde_json::from_value::<RawCard>(row) {
            Ok(raw) => cards.extend(raw.into_card()),
            Err(e) => warn!("skipping malformed catalog entry: {}", e),
        }
    }
    Ok(cards)
}

// ---------------------------------------------------------------------------
// Public loaders
// ---------------------------------------------------------------------------

/// Load the card pool from `path`, choosing the parser by file extension.
pub fn load_catalog(path: &Path) -> Result<Vec<Card>, CatalogError> {
    let shown = path.display().to_string();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let open = || {
        std::fs::File::open(path).map_err(|e| CatalogError::Io {
            path: shown.clone(),
            source: e,
        })
    };

    let cards = match extension.as_deref() {
        Some("json") => load_json_from_reader(open()?).map_err(|e| CatalogError::Json {
            path: shown.clone(),
            source: e,
        })?,
        Some("csv") => load_csv_from_reader(open()?).map_err(|e| CatalogError::Csv {
            path: shown.clone(),
            source: e,
        })?,
        _ => return Err(CatalogError::UnsupportedFormat { path: shown }),
    };

    if cards.is_empty() {
        return Err(CatalogError::Empty { path: shown });
    }

    info!("Loaded {} cards from {}", cards.len(), shown);
    Ok(cards)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_parse() {
        let data = "\
id,fullName,color,cost,rarity,image
1,Ariel - On Human Legs,Amber,4,Uncommon,https://img/1.png
2,Be Prepared,Ruby,7,Rare,
";
        let cards = load_csv_from_reader(data.as_bytes()).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].id, "1");
        assert_eq!(cards[0].full_name, "Ariel - On Human Legs");
        assert_eq!(cards[0].color, Color::Amber);
        assert_eq!(cards[0].cost, Some(4));
        assert_eq!(cards[0].rarity, Some(Rarity::Uncommon));
        assert_eq!(cards[0].image.as_deref(), Some("https://img/1.png"));
        assert_eq!(cards[1].rarity, Some(Rarity::Rare));
        assert!(cards[1].image.is_none());
    }

    #[test]
    fn csv_unknown_color_row_skipped() {
        let data = "\
id,fullName,color,cost,rarity,image
1,Good Card,Steel,2,Common,
2,Bad Card,Purple,2,Common,
";
        let cards = load_csv_from_reader(data.as_bytes()).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].full_name, "Good Card");
    }

    #[test]
    fn unknown_or_blank_rarity_is_unranked() {
        let data = "\
id,fullName,color,cost,rarity,image
1,Promo Card,Emerald,3,Promo,
2,Blank Card,Emerald,3,,
";
        let cards = load_csv_from_reader(data.as_bytes()).unwrap();
        assert_eq!(cards.len(), 2);
        assert!(cards.iter().all(|c| c.rarity.is_none()));
        assert!(cards.iter().all(|c| c.rarity_rank() == 0));
    }

    #[test]
    fn json_records_parse_with_numeric_ids() {
        let data = r#"[
            {"id": 7, "fullName": "Elsa - Spirit of Winter", "color": "amethyst", "cost": 8, "rarity": "Legendary"},
            {"id": "x9", "fullName": "Dinglehopper", "color": "Steel", "rarity": "Super Rare", "imageUrl": "img.png"}
        ]"#;
        let cards = load_json_from_reader(data.as_bytes()).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].id, "7");
        assert_eq!(cards[0].color, Color::Amethyst);
        assert_eq!(cards[0].rarity, Some(Rarity::Legendary));
        assert_eq!(cards[1].id, "x9");
        assert_eq!(cards[1].cost, None);
        assert_eq!(cards[1].rarity, Some(Rarity::SuperRare));
        assert_eq!(cards[1].image.as_deref(), Some("img.png"));
    }

    #[test]
    fn csv_ids_keep_leading_zeros() {
        let data = "\
id,fullName,color,cost,rarity,image
007,Secret Agent,Sapphire,3,Rare,
10,Plain Id,Sapphire,3,Rare,
";
        let cards = load_csv_from_reader(data.as_bytes()).unwrap();
        assert_eq!(cards[0].id, "007");
        assert_eq!(cards[1].id, "10");
    }

    #[test]
    fn json_malformed_entry_skipped() {
        let data = r#"[
            {"id": 1, "fullName": "Kept", "color": "Ruby"},
            {"id": 2, "color": "Ruby"}
        ]"#;
        let cards = load_json_from_reader(data.as_bytes()).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].full_name, "Kept");
    }

    #[test]
    fn loads_from_file_and_counts_cards() {
        let path = std::env::temp_dir().join("sealed_draft_catalog_load.csv");
        std::fs::write(
            &path,
            "id,fullName,color,cost,rarity,image\n1,Only Card,Amber,1,Common,\n",
        )
        .unwrap();
        let cards = load_catalog(&path).unwrap();
        assert_eq!(cards.len(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_catalog(Path::new("cards.xml")).unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedFormat { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_catalog(Path::new("definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
