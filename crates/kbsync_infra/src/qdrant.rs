use std::time::Duration;

use kbsync_domain::{CollectionStats, ConfigurationError, StoredPoint, VectorStore, VectorStoreError};
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{PointId, ScrollPointsBuilder, Value as QdrantValue};
use qdrant_client::Qdrant;
use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

const SCROLL_PAGE: u32 = 100;

/// Hard stop for a single scroll, in case the offset never runs out.
const MAX_POINTS: usize = 100_000;

/// Read-only access to the application's Qdrant collections.
pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ConfigurationError> {
        let client = Qdrant::from_url(url)
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigurationError::InvalidEndpoint {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl VectorStore for QdrantVectorStore {
    async fn scroll(&self, collection: &str) -> Result<Vec<StoredPoint>, VectorStoreError> {
        let mut points = Vec::new();
        let mut offset: Option<PointId> = None;

        loop {
            let mut request = ScrollPointsBuilder::new(collection)
                .limit(SCROLL_PAGE)
                .with_payload(true);
            if let Some(offset) = offset.take() {
                request = request.offset(offset);
            }

            let response = self
                .client
                .scroll(request)
                .await
                .map_err(|e| VectorStoreError::Request(e.to_string()))?;

            points.extend(response.result.into_iter().map(|point| StoredPoint {
                id: point.id.map(point_id_text).unwrap_or_default(),
                payload: point
                    .payload
                    .into_iter()
                    .map(|(key, value)| (key, to_json(value)))
                    .collect(),
            }));

            match next_page(collection, response.next_page_offset, points.len()) {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        debug!(collection, points = points.len(), "Scrolled collection");
        Ok(points)
    }

    async fn collections(&self) -> Result<Vec<CollectionStats>, VectorStoreError> {
        let listing = self
            .client
            .list_collections()
            .await
            .map_err(|e| VectorStoreError::Connection(e.to_string()))?;

        let mut stats = Vec::with_capacity(listing.collections.len());
        for collection in listing.collections {
            let info = self
                .client
                .collection_info(collection.name.clone())
                .await
                .map_err(|e| VectorStoreError::Request(e.to_string()))?;
            let points = info.result.and_then(|info| info.points_count).unwrap_or(0);
            stats.push(CollectionStats { name: collection.name, points });
        }
        Ok(stats)
    }
}

/// Offset of the next page, or `None` once the collection is exhausted or
/// the scroll hit [`MAX_POINTS`].
fn next_page<T>(collection: &str, next: Option<T>, collected: usize) -> Option<T> {
    let next = next?;
    if collected >= MAX_POINTS {
        warn!(collection, collected, max = MAX_POINTS, "Scroll capped, counts may be incomplete");
        return None;
    }
    Some(next)
}

fn point_id_text(id: PointId) -> String {
    match id.point_id_options {
        Some(PointIdOptions::Num(num)) => num.to_string(),
        Some(PointIdOptions::Uuid(uuid)) => uuid,
        None => String::new(),
    }
}

/// Converts a Qdrant payload value into plain JSON.
fn to_json(value: QdrantValue) -> Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(flag)) => Value::Bool(flag),
        Some(Kind::IntegerValue(number)) => Value::Number(number.into()),
        Some(Kind::DoubleValue(number)) => {
            Number::from_f64(number).map(Value::Number).unwrap_or(Value::Null)
        }
        Some(Kind::StringValue(text)) => Value::String(text),
        Some(Kind::ListValue(list)) => Value::Array(list.values.into_iter().map(to_json).collect()),
        Some(Kind::StructValue(object)) => Value::Object(
            object
                .fields
                .into_iter()
                .map(|(key, value)| (key, to_json(value)))
                .collect::<Map<_, _>>(),
        ),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use qdrant_client::qdrant::ListValue;
    use serde_json::json;

    use super::*;

    fn value(kind: Kind) -> QdrantValue {
        QdrantValue { kind: Some(kind) }
    }

    #[test]
    fn test_to_json_scalars() {
        assert_eq!(to_json(value(Kind::BoolValue(true))), json!(true));
        assert_eq!(to_json(value(Kind::IntegerValue(20))), json!(20));
        assert_eq!(to_json(value(Kind::StringValue("cte".to_string()))), json!("cte"));
        assert_eq!(to_json(QdrantValue { kind: None }), Value::Null);
        assert_eq!(to_json(value(Kind::DoubleValue(f64::NAN))), Value::Null);
    }

    #[test]
    fn test_to_json_list() {
        let list = value(Kind::ListValue(ListValue {
            values: vec![value(Kind::StringValue("a".to_string())), value(Kind::IntegerValue(1))],
        }));
        assert_eq!(to_json(list), json!(["a", 1]));
    }

    #[test]
    fn test_next_page_stops_at_cap() {
        assert_eq!(next_page("instructions", Some(7), 100), Some(7));
        assert_eq!(next_page("instructions", Some(7), MAX_POINTS), None);
        assert_eq!(next_page::<u64>("instructions", None, 100), None);
    }

    #[test]
    fn test_point_id_text() {
        let numeric = PointId { point_id_options: Some(PointIdOptions::Num(7)) };
        assert_eq!(point_id_text(numeric), "7");
        let uuid = PointId {
            point_id_options: Some(PointIdOptions::Uuid(
                "0b6d6b5e-0000-4000-8000-000000000000".to_string(),
            )),
        };
        assert_eq!(point_id_text(uuid), "0b6d6b5e-0000-4000-8000-000000000000");
    }
}
