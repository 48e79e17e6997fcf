use crate::Error;
use notify_sql::NotifyOn;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Request is the JSON body of a `POST /slack-notify` call.
#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Site whose integration receives the notification.
    #[serde(default)]
    pub site_id: Option<String>,
    /// Send a test message, regardless of `type`.
    #[serde(default)]
    pub test: Option<bool>,
    /// Notification kind: `daily_digest`, `goal_completed` or `traffic_spike`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Kind-specific fields, passed through into the rendered message.
    #[serde(default)]
    pub data: Option<Value>,
}

/// Notification is a Request resolved to its kind and that kind's fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Test,
    DailyDigest(DigestData),
    GoalCompleted(GoalData),
    TrafficSpike(SpikeData),
}

#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestData {
    pub visitors: Option<Value>,
    pub pageviews: Option<Value>,
    pub bounce_rate: Option<Value>,
    pub avg_duration: Option<Value>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalData {
    pub goal_name: Option<Value>,
    pub conversions: Option<Value>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpikeData {
    pub current_visitors: Option<Value>,
    pub average_visitors: Option<Value>,
    pub increase_percent: Option<Value>,
}

impl Notification {
    /// Resolve the notification of a request. A truthy `test` wins over `type`.
    pub fn from_request(request: &Request) -> Result<Self, Error> {
        if request.test.unwrap_or(false) {
            return Ok(Notification::Test);
        }
        let data = request.data.as_ref();

        match request.kind.as_deref() {
            Some("daily_digest") => Ok(Notification::DailyDigest(fields(data))),
            Some("goal_completed") => Ok(Notification::GoalCompleted(fields(data))),
            Some("traffic_spike") => Ok(Notification::TrafficSpike(fields(data))),
            _ => Err(Error::Validation("Unknown notification type")),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Test => "test",
            Notification::DailyDigest(_) => "daily_digest",
            Notification::GoalCompleted(_) => "goal_completed",
            Notification::TrafficSpike(_) => "traffic_spike",
        }
    }

    /// Whether the site's preferences allow this notification.
    /// Test messages are always allowed.
    pub fn is_enabled(&self, notify_on: &NotifyOn) -> bool {
        match self {
            Notification::Test => true,
            Notification::DailyDigest(_) => notify_on.daily_digest,
            Notification::GoalCompleted(_) => notify_on.goal_completed,
            Notification::TrafficSpike(_) => notify_on.traffic_spike,
        }
    }
}

// Data which isn't an object carries no fields. Fields are untyped values,
// so an object always deserializes.
fn fields<T: DeserializeOwned + Default>(data: Option<&Value>) -> T {
    match data {
        Some(data @ Value::Object(_)) => serde_json::from_value(data.clone()).unwrap_or_default(),
        _ => T::default(),
    }
}

/// Display a pass-through data value, or `default` if it's falsy:
/// absent, null, false, empty, or zero.
pub fn display_or(value: &Option<Value>, default: &str) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => default.to_string(),
        Some(Value::String(s)) if s.is_empty() => default.to_string(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_f64() {
            // Integral floats display as integers: 35.0 => "35".
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}
