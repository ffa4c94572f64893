//! Beat pattern validation
//!
//! A beat pattern maps instrument names to bars, each bar being a list of
//! integer steps:
//!
//! ```json
//! {"kick": [[1,0,1,0]], "snare": [[0,1,0,1]], "high-hat": [[1,1,1,1]],
//!  "tom1": [[0,0,0,0]], "tom2": [[0,0,0,0]]}
//! ```
//!
//! Step semantics (0 = silent, nonzero = hit) belong to the player; only the
//! shape is checked here. Bars of different instruments may differ in length.

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Number, Value};

use crate::error::ValidationError;

/// Instruments every pattern must define. Extra instruments are allowed.
pub const REQUIRED_INSTRUMENTS: [&str; 5] = ["kick", "snare", "high-hat", "tom1", "tom2"];

/// One step: any JSON integer, signed or unsigned
pub type Step = i128;

/// One bar of steps
pub type Bar = Vec<Step>;

/// Validated per-instrument step grid
///
/// Instruments keep the order in which they were declared in the submitted
/// document, so serializing a pattern reproduces its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeatPattern {
    tracks: Vec<(String, Vec<Bar>)>,
}

impl BeatPattern {
    /// Instruments in declaration order
    pub fn instruments(&self) -> impl Iterator<Item = &str> {
        self.tracks.iter().map(|(name, _)| name.as_str())
    }

    /// Bars for one instrument
    pub fn bars(&self, instrument: &str) -> Option<&[Bar]> {
        self.tracks
            .iter()
            .find(|(name, _)| name == instrument)
            .map(|(_, bars)| bars.as_slice())
    }

    /// JSON form of the pattern
    pub fn to_value(&self) -> Value {
        let map = self
            .tracks
            .iter()
            .map(|(name, bars)| (name.clone(), bars_value(bars)))
            .collect();
        Value::Object(map)
    }
}

fn bars_value(bars: &[Bar]) -> Value {
    bars.iter()
        .map(|bar| bar.iter().map(|&step| Value::Number(step_number(step))).collect::<Vec<Value>>())
        .collect()
}

/// Steps are only ever built from i64 or u64 JSON numbers.
fn step_number(step: Step) -> Number {
    match u64::try_from(step) {
        Ok(unsigned) => Number::from(unsigned),
        Err(_) => Number::from(step as i64),
    }
}

fn json_step(value: &Value) -> Option<Step> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_i64()
        .map(Step::from)
        .or_else(|| n.as_u64().map(Step::from))
}

impl Serialize for BeatPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tracks.len()))?;
        for (name, bars) in &self.tracks {
            map.serialize_entry(name, &bars_value(bars))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BeatPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let document = Value::deserialize(deserializer)?;
        validate_beat_schema(&document).map_err(de::Error::custom)
    }
}

/// Validate a submitted beat pattern document.
///
/// The required set is checked first. Then the instruments present in the
/// document are walked in declaration order, bar by bar, step by step, and
/// the first violation is returned.
pub fn validate_beat_schema(document: &Value) -> Result<BeatPattern, ValidationError> {
    let Value::Object(instruments) = document else {
        return Err(ValidationError::field("beat_schema", "must be a mapping"));
    };

    if !REQUIRED_INSTRUMENTS
        .iter()
        .all(|instrument| instruments.contains_key(*instrument))
    {
        return Err(ValidationError::MissingInstrument);
    }

    let mut tracks = Vec::with_capacity(instruments.len());
    for (instrument, value) in instruments {
        let Value::Array(raw_bars) = value else {
            return Err(ValidationError::MalformedBar {
                instrument: instrument.clone(),
            });
        };

        let mut bars = Vec::with_capacity(raw_bars.len());
        for raw_bar in raw_bars {
            let Value::Array(raw_steps) = raw_bar else {
                return Err(ValidationError::MalformedBar {
                    instrument: instrument.clone(),
                });
            };
            let bar = raw_steps
                .iter()
                .map(json_step)
                .collect::<Option<Bar>>()
                .ok_or_else(|| ValidationError::MalformedStep {
                    instrument: instrument.clone(),
                })?;
            bars.push(bar);
        }
        tracks.push((instrument.clone(), bars));
    }

    Ok(BeatPattern { tracks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn basic_pattern() -> Value {
        json!({
            "kick": [[1, 0, 1, 0]],
            "snare": [[0, 1, 0, 1]],
            "high-hat": [[1, 1, 1, 1]],
            "tom1": [[0, 0, 0, 0]],
            "tom2": [[0, 0, 0, 0]]
        })
    }

    #[test]
    fn accepts_basic_pattern() {
        let pattern = validate_beat_schema(&basic_pattern()).expect("pattern should be valid");
        assert_eq!(pattern.bars("kick"), Some(&[vec![1, 0, 1, 0]][..]));
        assert_eq!(
            pattern.instruments().collect::<Vec<_>>(),
            vec!["kick", "snare", "high-hat", "tom1", "tom2"]
        );
    }

    #[test]
    fn round_trips_document_unchanged() {
        let doc = json!({
            "tom2": [[0, 0], [1, 1, 1]],
            "cowbell": [[3, 0, 0, 0]],
            "kick": [[1, 0, 1, 0], []],
            "snare": [],
            "high-hat": [[127]],
            "tom1": [[-1, 0]]
        });
        let pattern = validate_beat_schema(&doc).unwrap();
        assert_eq!(pattern.to_value(), doc);
        assert_eq!(serde_json::to_value(&pattern).unwrap(), doc);
        assert_eq!(
            serde_json::to_string(&pattern).unwrap(),
            serde_json::to_string(&doc).unwrap()
        );
    }

    #[test]
    fn each_missing_instrument_is_rejected() {
        for missing in REQUIRED_INSTRUMENTS {
            let mut doc = basic_pattern();
            doc.as_object_mut().unwrap().remove(missing);
            assert_eq!(
                validate_beat_schema(&doc),
                Err(ValidationError::MissingInstrument),
                "removing {missing} should fail"
            );
        }
    }

    #[test]
    fn missing_instrument_wins_over_structure_errors() {
        let doc = json!({"kick": "notalist"});
        assert_eq!(
            validate_beat_schema(&doc),
            Err(ValidationError::MissingInstrument)
        );
    }

    #[test]
    fn instrument_not_a_list_is_malformed_bar() {
        let mut doc = basic_pattern();
        doc["kick"] = json!("notalist");
        assert_eq!(
            validate_beat_schema(&doc),
            Err(ValidationError::MalformedBar {
                instrument: "kick".into()
            })
        );
    }

    #[test]
    fn bar_not_a_list_is_malformed_bar() {
        let mut doc = basic_pattern();
        doc["snare"] = json!([[0, 1], 1]);
        assert_eq!(
            validate_beat_schema(&doc),
            Err(ValidationError::MalformedBar {
                instrument: "snare".into()
            })
        );
    }

    #[test]
    fn non_integer_step_is_malformed_step() {
        let mut doc = basic_pattern();
        doc["kick"] = json!([[1, "x"]]);
        assert_eq!(
            validate_beat_schema(&doc),
            Err(ValidationError::MalformedStep {
                instrument: "kick".into()
            })
        );

        for bad in [json!(0.5), json!(true), json!(null), json!([1])] {
            let mut doc = basic_pattern();
            doc["tom1"] = json!([[0, bad]]);
            assert!(matches!(
                validate_beat_schema(&doc),
                Err(ValidationError::MalformedStep { .. })
            ));
        }
    }

    #[test]
    fn accepts_integers_beyond_i64() {
        let mut doc = basic_pattern();
        doc["kick"] = json!([[18446744073709551615u64, 0, i64::MIN]]);

        let pattern = validate_beat_schema(&doc).expect("all steps are integers");

        assert_eq!(
            pattern.bars("kick"),
            Some(&[vec![u64::MAX as i128, 0, i64::MIN as i128]][..])
        );
        assert_eq!(pattern.to_value(), doc);
        assert_eq!(
            serde_json::to_string(&pattern).unwrap(),
            serde_json::to_string(&doc).unwrap()
        );
    }

    #[test]
    fn extra_instruments_are_checked_too() {
        let mut doc = basic_pattern();
        doc["cowbell"] = json!([["loud"]]);
        assert_eq!(
            validate_beat_schema(&doc),
            Err(ValidationError::MalformedStep {
                instrument: "cowbell".into()
            })
        );
    }

    #[test]
    fn first_error_in_declaration_order_wins() {
        let doc = json!({
            "tom2": [[0, "x"]],
            "kick": "notalist",
            "snare": [[0]],
            "high-hat": [[0]],
            "tom1": [[0]]
        });
        assert_eq!(
            validate_beat_schema(&doc),
            Err(ValidationError::MalformedStep {
                instrument: "tom2".into()
            })
        );
    }

    #[test]
    fn non_mapping_document_is_rejected() {
        let err = validate_beat_schema(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidField {
                field: "beat_schema",
                ..
            }
        ));
    }

    #[test]
    fn deserialize_runs_validation() {
        let ok: BeatPattern = serde_json::from_value(basic_pattern()).unwrap();
        assert_eq!(ok.bars("tom2"), Some(&[vec![0, 0, 0, 0]][..]));

        let err = serde_json::from_value::<BeatPattern>(json!({"kick": [[1]]})).unwrap_err();
        assert!(err.to_string().contains("must contain following instruments"));
    }
}
