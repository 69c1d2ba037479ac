//! Stacked bar layers.
//!
//! Each key becomes one layer; within a row, layers are laid on top of each
//! other in key order starting from zero. Negative values extend downward
//! from the running top, so the baseline is never reset.

use serde::Serialize;

/// One bar segment of a layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StackSegment {
    pub x: String,
    pub y0: f64,
    pub y1: f64,
}

/// All segments of one key, in row order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StackLayer {
    pub key: String,
    pub segments: Vec<StackSegment>,
}

/// A stack key and the accessor that reads its value from a row.
pub type StackKey<'a, T> = (&'a str, &'a dyn Fn(&T) -> f64);

/// Stack `keys` over `rows`, labelling each segment with `x(row)`.
pub fn stack_layers<T>(
    rows: &[T],
    keys: &[StackKey<'_, T>],
    x: impl Fn(&T) -> String,
) -> Vec<StackLayer> {
    let mut tops = vec![0.0_f64; rows.len()];
    keys.iter()
        .map(|(key, value)| StackLayer {
            key: key.to_string(),
            segments: rows
                .iter()
                .zip(tops.iter_mut())
                .map(|(row, top)| {
                    let y0 = *top;
                    *top += value(row);
                    StackSegment {
                        x: x(row),
                        y0,
                        y1: *top,
                    }
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        day: &'static str,
        a: f64,
        b: f64,
    }

    #[test]
    fn layers_accumulate_per_row() {
        let rows = [
            Row { day: "d1", a: 0.25, b: 0.5 },
            Row { day: "d2", a: 0.5, b: 0.25 },
        ];
        let keys: [StackKey<'_, Row>; 2] = [("a", &|r: &Row| r.a), ("b", &|r: &Row| r.b)];
        let layers = stack_layers(&rows, &keys, |r| r.day.to_string());

        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].key, "a");
        assert_eq!(
            layers[0].segments[0],
            StackSegment { x: "d1".to_string(), y0: 0.0, y1: 0.25 }
        );
        assert_eq!(
            layers[1].segments[0],
            StackSegment { x: "d1".to_string(), y0: 0.25, y1: 0.75 }
        );
        assert_eq!(layers[1].segments[1].y0, 0.5);
        assert_eq!(layers[1].segments[1].y1, 0.75);
    }

    #[test]
    fn negative_values_extend_downward() {
        let rows = [Row { day: "d1", a: 0.5, b: -0.25 }];
        let keys: [StackKey<'_, Row>; 2] = [("a", &|r: &Row| r.a), ("b", &|r: &Row| r.b)];
        let layers = stack_layers(&rows, &keys, |r| r.day.to_string());
        assert_eq!(layers[1].segments[0].y0, 0.5);
        assert_eq!(layers[1].segments[0].y1, 0.25);
    }

    #[test]
    fn empty_rows_give_empty_layers() {
        let rows: [Row; 0] = [];
        let keys: [StackKey<'_, Row>; 1] = [("a", &|r: &Row| r.a)];
        let layers = stack_layers(&rows, &keys, |r| r.day.to_string());
        assert_eq!(layers.len(), 1);
        assert!(layers[0].segments.is_empty());
    }
}
