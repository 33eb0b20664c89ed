use crate::domain::notification::WebhookNotification;
use crate::error::{BridgeError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io::Read;

#[derive(Debug, Deserialize)]
struct NotificationRecord {
    #[serde(default)]
    reference: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    invoice_id: Option<String>,
}

impl NotificationRecord {
    fn into_body(self) -> Value {
        let mut body = Map::new();
        for (key, value) in [
            ("reference", self.reference),
            ("status", self.status),
            ("invoice_id", self.invoice_id),
        ] {
            if let Some(value) = value {
                body.insert(key.to_string(), Value::String(value));
            }
        }
        Value::Object(body)
    }
}

/// Reads recorded processor notifications (`reference,status[,invoice_id]`) for replay.
pub struct NotificationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> NotificationReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily yields notifications, validated exactly as webhook bodies are.
    pub fn notifications(self) -> impl Iterator<Item = Result<WebhookNotification>> {
        self.reader
            .into_deserialize::<NotificationRecord>()
            .map(|record| {
                let body = record.map_err(BridgeError::from)?.into_body();
                WebhookNotification::from_value(&body)
            })
    }
}
