// Vocabulary model and file parsing (TSV and JSON forms).

use crate::CompileError;

/// One vocabulary entry: the token text, its id, and an optional score.
///
/// Ids double as BPE merge priorities: a lower id merges earlier in
/// training and wins segmentation conflicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabEntry {
    pub token: String,
    pub id: i32,
    pub score: Option<i32>,
}

/// An ordered subword vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocab {
    pub entries: Vec<VocabEntry>,
}

impl Vocab {
    /// Build a vocabulary from `(token, id)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, i32)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(token, id)| VocabEntry {
                    token: token.to_string(),
                    id,
                    score: None,
                })
                .collect(),
        }
    }

    /// Parse the TSV form: one `token \t id [\t score]` entry per line.
    /// Blank lines and `#` comment lines are skipped.
    pub fn parse_tsv(text: &str) -> Result<Self, CompileError> {
        let mut entries = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            if raw.is_empty() || raw.starts_with('#') {
                continue;
            }

            let mut fields = raw.split('\t');
            let token = fields.next().unwrap_or_default();
            let id_field = fields.next().ok_or_else(|| CompileError::Malformed {
                line,
                msg: "expected `token<TAB>id`".to_string(),
            })?;
            let id: i32 = id_field.parse().map_err(|_| CompileError::Malformed {
                line,
                msg: format!("id {id_field:?} is not an integer"),
            })?;

            let score = match fields.next() {
                Some(s) => Some(s.parse().map_err(|_| CompileError::Malformed {
                    line,
                    msg: format!("score {s:?} is not an integer"),
                })?),
                None => None,
            };
            if fields.next().is_some() {
                return Err(CompileError::Malformed {
                    line,
                    msg: "too many fields".to_string(),
                });
            }

            entries.push(VocabEntry {
                token: token.to_string(),
                id,
                score,
            });
        }

        Ok(Self { entries })
    }

    /// Parse the JSON form: one object mapping tokens to integer ids,
    /// `{"token": id, ...}`.
    pub fn parse_json(text: &str) -> Result<Self, CompileError> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(text)?;

        let mut entries = Vec::with_capacity(map.len());
        for (token, value) in map {
            let id = value
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| CompileError::NonIntegerId {
                    token: token.clone(),
                })?;
            entries.push(VocabEntry {
                token,
                id,
                score: None,
            });
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
