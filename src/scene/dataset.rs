use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

use super::color::{format_hex_color, parse_hex_color};
use crate::error::PickError;
use crate::options::{DatasetLayout, DatasetOptions};
use crate::picking::codec::{unit_to_byte, MAX_PICK_ID, NO_HIT};

/// A single pickable point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    /// Pick id, unique within its dataset, in `1..=MAX_PICK_ID`.
    pub id: u32,
    /// Horizontal position in normalized device coordinates.
    pub x: f32,
    /// Vertical position in normalized device coordinates.
    pub y: f32,
    /// Display colour.
    pub color: [u8; 3],
    /// Text shown in the tooltip when the point is hovered.
    pub label: String,
}

/// The fixed, ordered set of points rendered by a sketch.
///
/// Built once at startup and never mutated. Ids are validated on
/// construction: non-zero, unique, and small enough to survive the 24-bit
/// colour encoding.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<PointRecord>,
    index: FxHashMap<u32, usize>,
}

impl Dataset {
    /// Build a dataset from explicit records.
    ///
    /// # Errors
    ///
    /// Returns [`PickError::InvalidDataset`] if an id is `0`, exceeds
    /// 24 bits, or appears twice.
    pub fn from_records(records: Vec<PointRecord>) -> Result<Self, PickError> {
        let mut index = FxHashMap::default();
        index.reserve(records.len());
        for (i, record) in records.iter().enumerate() {
            if record.id == NO_HIT {
                return Err(PickError::InvalidDataset(format!(
                    "point {i} uses the reserved no-hit id 0"
                )));
            }
            if record.id > MAX_PICK_ID {
                return Err(PickError::InvalidDataset(format!(
                    "point id {} does not fit in 24 bits",
                    record.id
                )));
            }
            if index.insert(record.id, i).is_some() {
                return Err(PickError::InvalidDataset(format!(
                    "duplicate point id {}",
                    record.id
                )));
            }
        }
        Ok(Self { records, index })
    }

    /// Generate the demo dataset described by `options`.
    ///
    /// Ids are assigned `1..=N` in generation order.
    ///
    /// # Errors
    ///
    /// Returns [`PickError::InvalidDataset`] if the palette is empty or
    /// malformed, or if the requested point count exceeds the id space.
    pub fn generate(options: &DatasetOptions) -> Result<Self, PickError> {
        let records = match options.layout {
            DatasetLayout::Scatter => scatter(options)?,
            DatasetLayout::Grid => grid(options)?,
        };
        log::debug!(
            "generated {} points ({:?} layout)",
            records.len(),
            options.layout
        );
        Self::from_records(records)
    }

    /// All points in draw order.
    #[must_use]
    pub fn records(&self) -> &[PointRecord] {
        &self.records
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a point by id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&PointRecord> {
        self.index.get(&id).map(|&i| &self.records[i])
    }

    /// Resolve a raw id decoded from the picking target.
    ///
    /// The no-hit id and ids with no matching record both resolve to
    /// `None`; neither is an error.
    #[must_use]
    pub fn resolve(&self, raw_id: u32) -> Option<&PointRecord> {
        if raw_id == NO_HIT {
            return None;
        }
        let record = self.get(raw_id);
        if record.is_none() {
            log::trace!("decoded id {raw_id} has no point; treating as miss");
        }
        record
    }
}

fn check_count(count: u64) -> Result<u32, PickError> {
    u32::try_from(count)
        .ok()
        .filter(|&n| n <= MAX_PICK_ID)
        .ok_or_else(|| {
            PickError::InvalidDataset(format!(
                "{count} points exceed the {MAX_PICK_ID} id limit"
            ))
        })
}

fn palette(options: &DatasetOptions) -> Result<Vec<[u8; 3]>, PickError> {
    if options.palette.is_empty() {
        return Err(PickError::InvalidDataset("palette is empty".to_owned()));
    }
    options
        .palette
        .iter()
        .map(|entry| {
            parse_hex_color(entry).ok_or_else(|| {
                PickError::InvalidDataset(format!(
                    "palette entry {entry:?} is not a #rrggbb colour"
                ))
            })
        })
        .collect()
}

/// Uniform random points in `[-1, 1)`, each coloured from the palette.
fn scatter(options: &DatasetOptions) -> Result<Vec<PointRecord>, PickError> {
    let count = check_count(u64::from(options.count))?;
    let colors = palette(options)?;
    let seed = options.seed.unwrap_or_else(rand::random);
    log::debug!("scatter dataset seed: {seed}");
    let mut rng = StdRng::seed_from_u64(seed);

    Ok((1..=count)
        .map(|id| {
            let color = colors[rng.random_range(0..colors.len())];
            PointRecord {
                id,
                x: (rng.random::<f32>() - 0.5) * 2.0,
                y: (rng.random::<f32>() - 0.5) * 2.0,
                color,
                label: format_hex_color(color),
            }
        })
        .collect())
}

/// A `rows x cols` grid spanning `[-1, 1]` (shifted by `offset`) with a
/// red/green gradient following position.
fn grid(options: &DatasetOptions) -> Result<Vec<PointRecord>, PickError> {
    let _ = check_count(u64::from(options.rows) * u64::from(options.cols))?;
    let step = |n: u32| if n > 1 { 2.0 / (n - 1) as f32 } else { 0.0 };
    let (col_step, row_step) = (step(options.cols), step(options.rows));
    let [dx, dy] = options.offset;

    let mut records = Vec::with_capacity(
        options.rows as usize * options.cols as usize,
    );
    for r in 0..options.rows {
        for c in 0..options.cols {
            let x = -1.0 + c as f32 * col_step + dx;
            let y = -1.0 + r as f32 * row_step + dy;
            let color = [
                unit_to_byte((x + 1.0) / 2.0),
                unit_to_byte((y + 1.0) / 2.0),
                0,
            ];
            records.push(PointRecord {
                id: records.len() as u32 + 1,
                x,
                y,
                color,
                label: format_hex_color(color),
            });
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: u32) -> PointRecord {
        PointRecord {
            id,
            x: 0.0,
            y: 0.0,
            color: [255, 0, 0],
            label: format!("p{id}"),
        }
    }

    #[test]
    fn rejects_reserved_and_oversized_ids() {
        assert!(matches!(
            Dataset::from_records(vec![point(0)]),
            Err(PickError::InvalidDataset(_))
        ));
        assert!(matches!(
            Dataset::from_records(vec![point(MAX_PICK_ID + 1)]),
            Err(PickError::InvalidDataset(_))
        ));
        assert!(Dataset::from_records(vec![point(MAX_PICK_ID)]).is_ok());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Dataset::from_records(vec![point(3), point(4), point(3)])
            .unwrap_err();
        assert!(err.to_string().contains("duplicate point id 3"));
    }

    #[test]
    fn resolve_treats_zero_and_unknown_as_miss() {
        let dataset = Dataset::from_records(vec![point(5)]).unwrap();
        assert_eq!(dataset.resolve(5).map(|p| p.label.as_str()), Some("p5"));
        assert!(dataset.resolve(NO_HIT).is_none());
        assert!(dataset.resolve(6).is_none());
    }

    #[test]
    fn scatter_is_deterministic_for_a_seed() {
        let options = DatasetOptions {
            seed: Some(1234),
            ..DatasetOptions::default()
        };
        let a = Dataset::generate(&options).unwrap();
        let b = Dataset::generate(&options).unwrap();
        assert_eq!(a.records(), b.records());
    }

    #[test]
    fn scatter_assigns_sequential_ids_and_palette_labels() {
        let options = DatasetOptions {
            seed: Some(9),
            ..DatasetOptions::default()
        };
        let dataset = Dataset::generate(&options).unwrap();
        assert_eq!(dataset.len(), 100);
        for (i, p) in dataset.records().iter().enumerate() {
            assert_eq!(p.id, i as u32 + 1);
            assert!((-1.0..1.0).contains(&p.x));
            assert!((-1.0..1.0).contains(&p.y));
            assert!(options.palette.contains(&p.label));
            assert_eq!(parse_hex_color(&p.label), Some(p.color));
        }
    }

    #[test]
    fn scatter_rejects_bad_palettes() {
        let empty = DatasetOptions {
            palette: Vec::new(),
            ..DatasetOptions::default()
        };
        assert!(Dataset::generate(&empty).is_err());

        let malformed = DatasetOptions {
            palette: vec!["teal".to_owned()],
            ..DatasetOptions::default()
        };
        assert!(Dataset::generate(&malformed).is_err());
    }

    #[test]
    fn grid_spans_clip_space_with_gradient() {
        let options = DatasetOptions {
            layout: DatasetLayout::Grid,
            rows: 3,
            cols: 5,
            ..DatasetOptions::default()
        };
        let dataset = Dataset::generate(&options).unwrap();
        assert_eq!(dataset.len(), 15);

        let first = &dataset.records()[0];
        assert_eq!((first.x, first.y), (-1.0, -1.0));
        assert_eq!(first.color, [0, 0, 0]);

        let last = &dataset.records()[14];
        assert_eq!(last.id, 15);
        assert!((last.x - 1.0).abs() < 1e-6);
        assert!((last.y - 1.0).abs() < 1e-6);
        assert_eq!(last.color, [255, 255, 0]);
        assert_eq!(last.label, "#ffff00");
    }

    #[test]
    fn single_column_grid_does_not_divide_by_zero() {
        let options = DatasetOptions {
            layout: DatasetLayout::Grid,
            rows: 2,
            cols: 1,
            offset: [0.5, 0.0],
            ..DatasetOptions::default()
        };
        let dataset = Dataset::generate(&options).unwrap();
        assert!(dataset.records().iter().all(|p| p.x == -0.5));
    }
}
