use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// Form fields coerced to integers before submission.
pub const NUMERIC_FIELDS: [&str; 4] = ["CreditScore", "Income", "TimeOnPage", "PagesVisited"];

pub const AGE_GROUPS: [&str; 4] = ["18-25", "26-35", "36-50", "51+"];
pub const FAMILY_BACKGROUNDS: [&str; 3] = ["Single", "Married", "Married with Kids"];
pub const LEAD_SOURCES: [&str; 5] = [
    "Organic Search",
    "Paid Ads",
    "Referral",
    "Social Media",
    "Direct",
];

// ============ Outbound (lead input) ============

/// Raw form submission: every field as entered, in form order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct LeadForm {
    pub fields: Vec<(String, String)>,
}

impl LeadForm {
    pub fn new<K, V, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Last value submitted under `name`, matching how duplicate keys collapse.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Builds the outgoing JSON body.
    ///
    /// All fields pass through as strings except [`NUMERIC_FIELDS`], which are
    /// always present and coerced with [`parse_int`].
    pub fn to_payload(&self) -> LeadPayload {
        let mut body = Map::new();
        for (name, value) in &self.fields {
            body.insert(name.clone(), Value::String(value.clone()));
        }
        for name in NUMERIC_FIELDS {
            let coerced = IntField::parse(self.get(name).unwrap_or_default());
            body.insert(name.to_string(), coerced.to_json());
        }
        LeadPayload(body)
    }
}

/// JSON body sent to the scoring endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LeadPayload(pub Map<String, Value>);

impl LeadPayload {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

/// A coerced numeric form field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntField {
    Int(i64),
    /// Digit run wider than `i64`, kept as the nearest float.
    Wide(f64),
    /// Not-a-number; encoded as JSON `null`.
    NaN,
}

impl IntField {
    pub fn parse(raw: &str) -> Self {
        let Some((negative, digits)) = integer_prefix(raw) else {
            return IntField::NaN;
        };
        if let Ok(magnitude) = digits.parse::<i64>() {
            return IntField::Int(if negative { -magnitude } else { magnitude });
        }
        // Runs past f64 range parse to infinity, which has no JSON form.
        let magnitude = digits.parse::<f64>().unwrap_or(f64::INFINITY);
        let value = if negative { -magnitude } else { magnitude };
        if value.is_finite() {
            IntField::Wide(value)
        } else {
            IntField::NaN
        }
    }

    pub fn to_json(self) -> Value {
        match self {
            IntField::Int(n) => Value::from(n),
            IntField::Wide(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
            IntField::NaN => Value::Null,
        }
    }
}

/// Splits off the sign and leading digit run after any leading whitespace.
fn integer_prefix(raw: &str) -> Option<(bool, &str)> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    Some((negative, &rest[..digits_len]))
}

/// Base-10 integer-prefix parse.
///
/// Skips leading whitespace, accepts one sign, then takes the longest run of
/// ASCII digits. Returns `None` when no digit follows or the value does not
/// fit in an `i64`; see [`IntField::parse`] for the wide case.
pub fn parse_int(raw: &str) -> Option<i64> {
    match IntField::parse(raw) {
        IntField::Int(n) => Some(n),
        IntField::Wide(_) | IntField::NaN => None,
    }
}

// ============ Inbound (scored lead) ============

/// A lead as returned by `GET /api/v1/leads`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLead {
    #[serde(rename = "Email", default)]
    pub email: String,
    #[serde(rename = "InitialScore", deserialize_with = "lenient_score", default = "nan")]
    pub initial_score: f64,
    /// Authoritative sort key.
    #[serde(rename = "RerankedScore", deserialize_with = "lenient_score", default = "nan")]
    pub reranked_score: f64,
    #[serde(rename = "Comments", default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl ScoredLead {
    /// Comments for display; empty or absent renders as `N/A`.
    pub fn comments_or_na(&self) -> &str {
        match self.comments.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => "N/A",
        }
    }
}

fn nan() -> f64 {
    f64::NAN
}

/// Accepts any JSON number; `null` or a non-number becomes NaN.
fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().unwrap_or(f64::NAN))
}

/// Orders leads by reranked score, highest first. Stable for ties; NaN sorts last.
pub fn sort_by_reranked_desc(leads: &mut [ScoredLead]) {
    fn key(score: f64) -> f64 {
        if score.is_nan() {
            f64::NEG_INFINITY
        } else {
            score
        }
    }
    leads.sort_by(|a, b| key(b.reranked_score).total_cmp(&key(a.reranked_score)));
}

// ============ Intent tiers ============

/// Three-tier visual category derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentTier {
    High,
    Medium,
    Low,
}

impl IntentTier {
    /// `>= 75` high, `>= 40` medium, everything else (NaN included) low.
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            IntentTier::High
        } else if score >= 40.0 {
            IntentTier::Medium
        } else {
            IntentTier::Low
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            IntentTier::High => "high-intent",
            IntentTier::Medium => "medium-intent",
            IntentTier::Low => "low-intent",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            IntentTier::High => "#10b981",
            IntentTier::Medium => "#f59e0b",
            IntentTier::Low => "#ef4444",
        }
    }
}
