//! DynamoDB-backed [`CourseStore`] implementation.
//!
//! Thin orchestration over the AWS SDK: bulk writes map to `BatchWriteItem`,
//! partition reads to `Query` with `ExclusiveStartKey` pagination, and the
//! counts to count-only `Query`/`Scan` loops. No retry or backoff beyond what
//! the SDK does internally.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::types::{AttributeValue, DeleteRequest, PutRequest, Select, WriteRequest};
use aws_sdk_dynamodb::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::course::{CategoryPair, Course, CourseKey, Level};
use crate::store::{CourseStore, QueryPage, StoreError};

/// Course table client for one DynamoDB table.
pub struct DynamoStore {
    client: Client,
    table: String,
}

impl DynamoStore {
    /// Connect to DynamoDB and verify the table exists.
    ///
    /// A failure here is fatal to the run: callers must not attempt any
    /// writes against a table that could not be described.
    pub async fn connect(region: &str, table: &str) -> Result<Self, StoreError> {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        let client = Client::new(&config);

        client
            .describe_table()
            .table_name(table)
            .send()
            .await
            .map_err(|e| StoreError::Request(format!("cannot load table '{table}': {e}")))?;

        tracing::info!("Connected to table '{}' in {}", table, region);
        Ok(Self {
            client,
            table: table.to_string(),
        })
    }

    fn key_attrs(key: &CourseKey) -> HashMap<String, AttributeValue> {
        HashMap::from([
            (
                "tenant_id".to_string(),
                AttributeValue::S(key.tenant_id.clone()),
            ),
            (
                "course_id".to_string(),
                AttributeValue::S(key.course_id.clone()),
            ),
        ])
    }
}

#[async_trait]
impl CourseStore for DynamoStore {
    async fn put_batch(&self, courses: &[Course]) -> Result<(), StoreError> {
        let mut writes = Vec::with_capacity(courses.len());
        for course in courses {
            let put = PutRequest::builder()
                .set_item(Some(to_item(course)))
                .build()
                .map_err(|e| StoreError::Request(e.to_string()))?;
            writes.push(WriteRequest::builder().put_request(put).build());
        }

        let out = self
            .client
            .batch_write_item()
            .request_items(self.table.clone(), writes)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let unprocessed = out
            .unprocessed_items()
            .and_then(|m| m.get(&self.table))
            .map(|v| v.len())
            .unwrap_or(0);
        if unprocessed > 0 {
            return Err(StoreError::Unprocessed(unprocessed));
        }
        Ok(())
    }

    async fn delete_batch(&self, keys: &[CourseKey]) -> Result<(), StoreError> {
        let mut writes = Vec::with_capacity(keys.len());
        for key in keys {
            let delete = DeleteRequest::builder()
                .set_key(Some(Self::key_attrs(key)))
                .build()
                .map_err(|e| StoreError::Request(e.to_string()))?;
            writes.push(WriteRequest::builder().delete_request(delete).build());
        }

        let out = self
            .client
            .batch_write_item()
            .request_items(self.table.clone(), writes)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let unprocessed = out
            .unprocessed_items()
            .and_then(|m| m.get(&self.table))
            .map(|v| v.len())
            .unwrap_or(0);
        if unprocessed > 0 {
            return Err(StoreError::Unprocessed(unprocessed));
        }
        Ok(())
    }

    async fn query_page(
        &self,
        tenant_id: &str,
        limit: Option<u32>,
        start_key: Option<CourseKey>,
    ) -> Result<QueryPage, StoreError> {
        let mut req = self
            .client
            .query()
            .table_name(&self.table)
            .key_condition_expression("tenant_id = :tenant_id")
            .expression_attribute_values(":tenant_id", AttributeValue::S(tenant_id.to_string()));
        if let Some(limit) = limit {
            req = req.limit(limit as i32);
        }
        if let Some(key) = start_key {
            req = req.set_exclusive_start_key(Some(Self::key_attrs(&key)));
        }

        let out = req
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let items = out
            .items()
            .iter()
            .map(from_item)
            .collect::<Result<Vec<_>, _>>()?;
        let last_key = match out.last_evaluated_key() {
            Some(attrs) => Some(key_from_attrs(attrs)?),
            None => None,
        };

        Ok(QueryPage { items, last_key })
    }

    async fn count_all(&self) -> Result<u64, StoreError> {
        let mut total = 0u64;
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;
        loop {
            let out = self
                .client
                .scan()
                .table_name(&self.table)
                .select(Select::Count)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| StoreError::Request(e.to_string()))?;
            total += out.count() as u64;
            match out.last_evaluated_key() {
                Some(key) => start_key = Some(key.clone()),
                None => return Ok(total),
            }
        }
    }

    async fn count_for_tenant(&self, tenant_id: &str) -> Result<u64, StoreError> {
        let mut total = 0u64;
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;
        loop {
            let out = self
                .client
                .query()
                .table_name(&self.table)
                .key_condition_expression("tenant_id = :tenant_id")
                .expression_attribute_values(
                    ":tenant_id",
                    AttributeValue::S(tenant_id.to_string()),
                )
                .select(Select::Count)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| StoreError::Request(e.to_string()))?;
            total += out.count() as u64;
            match out.last_evaluated_key() {
                Some(key) => start_key = Some(key.clone()),
                None => return Ok(total),
            }
        }
    }
}

/// Encode a course as a DynamoDB attribute map. Decimals travel as `N`
/// attributes carrying the exact decimal string; optional fields are simply
/// absent when unset.
pub(crate) fn to_item(course: &Course) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();
    item.insert(
        "tenant_id".to_string(),
        AttributeValue::S(course.tenant_id.clone()),
    );
    item.insert(
        "course_id".to_string(),
        AttributeValue::S(course.course_id.clone()),
    );
    item.insert("name".to_string(), AttributeValue::S(course.name.clone()));
    item.insert(
        "description".to_string(),
        AttributeValue::S(course.description.clone()),
    );
    item.insert(
        "instructor".to_string(),
        AttributeValue::S(course.instructor.clone()),
    );
    item.insert(
        "price".to_string(),
        AttributeValue::N(course.price.to_string()),
    );
    if let Some(original) = course.original_price {
        item.insert(
            "original_price".to_string(),
            AttributeValue::N(original.to_string()),
        );
    }
    item.insert(
        "rating".to_string(),
        AttributeValue::N(course.rating.to_string()),
    );
    item.insert(
        "students".to_string(),
        AttributeValue::N(course.students.to_string()),
    );
    item.insert(
        "duration".to_string(),
        AttributeValue::S(course.duration.clone()),
    );
    item.insert(
        "image_url".to_string(),
        AttributeValue::S(course.image_url.clone()),
    );
    if let Some(pair) = &course.categories {
        item.insert(
            "categories".to_string(),
            AttributeValue::L(vec![
                AttributeValue::S(pair.coarse.clone()),
                AttributeValue::S(pair.fine.clone()),
            ]),
        );
    }
    if let Some(level) = course.level {
        item.insert(
            "level".to_string(),
            AttributeValue::S(level.as_str().to_string()),
        );
    }
    item
}

/// Decode a stored item. Key attributes are required; everything else is
/// lenient so foreign records in the partition do not abort a scan.
pub(crate) fn from_item(item: &HashMap<String, AttributeValue>) -> Result<Course, StoreError> {
    let tenant_id = get_s(item, "tenant_id")
        .ok_or_else(|| StoreError::Malformed("missing tenant_id".to_string()))?;
    let course_id = get_s(item, "course_id")
        .ok_or_else(|| StoreError::Malformed("missing course_id".to_string()))?;

    let categories = item
        .get("categories")
        .and_then(|v| v.as_l().ok())
        .and_then(|list| {
            let mut labels = list.iter().filter_map(|v| v.as_s().ok().cloned());
            let coarse = labels.next()?;
            let fine = labels.next().unwrap_or_default();
            Some(CategoryPair::new(coarse, fine))
        });

    Ok(Course {
        tenant_id,
        course_id,
        name: get_s(item, "name").unwrap_or_default(),
        description: get_s(item, "description").unwrap_or_default(),
        instructor: get_s(item, "instructor").unwrap_or_default(),
        price: get_n(item, "price")?.unwrap_or_default(),
        original_price: get_n(item, "original_price")?,
        rating: get_n(item, "rating")?.unwrap_or_default(),
        students: get_n(item, "students")?
            .and_then(|d| d.to_u32())
            .unwrap_or(0),
        duration: get_s(item, "duration").unwrap_or_default(),
        image_url: get_s(item, "image_url").unwrap_or_default(),
        categories,
        level: get_s(item, "level").as_deref().and_then(Level::parse),
    })
}

pub(crate) fn key_from_attrs(
    attrs: &HashMap<String, AttributeValue>,
) -> Result<CourseKey, StoreError> {
    Ok(CourseKey {
        tenant_id: get_s(attrs, "tenant_id")
            .ok_or_else(|| StoreError::Malformed("missing tenant_id in page key".to_string()))?,
        course_id: get_s(attrs, "course_id")
            .ok_or_else(|| StoreError::Malformed("missing course_id in page key".to_string()))?,
    })
}

fn get_s(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}

fn get_n(
    item: &HashMap<String, AttributeValue>,
    name: &str,
) -> Result<Option<Decimal>, StoreError> {
    match item.get(name) {
        None => Ok(None),
        Some(value) => {
            let text = value
                .as_n()
                .map_err(|_| StoreError::Malformed(format!("attribute '{name}' is not numeric")))?;
            text.parse::<Decimal>()
                .map(Some)
                .map_err(|e| StoreError::Malformed(format!("attribute '{name}': {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::CourseGenerator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_item_roundtrip_full() {
        let generator = CourseGenerator::new("TENANT_A");
        let mut rng = StdRng::seed_from_u64(42);
        let course = generator.generate(&mut rng);

        let decoded = from_item(&to_item(&course)).unwrap();
        assert_eq!(decoded, course);
    }

    #[test]
    fn test_item_roundtrip_minimal() {
        let generator = CourseGenerator::new("TENANT_A");
        let mut rng = StdRng::seed_from_u64(42);
        let mut course = generator.generate(&mut rng);
        course.categories = None;
        course.level = None;
        course.original_price = None;

        let item = to_item(&course);
        assert!(!item.contains_key("categories"));
        assert!(!item.contains_key("level"));
        assert!(!item.contains_key("original_price"));

        let decoded = from_item(&item).unwrap();
        assert_eq!(decoded, course);
    }

    #[test]
    fn test_decimal_wire_format_is_exact() {
        let generator = CourseGenerator::new("TENANT_A");
        let mut rng = StdRng::seed_from_u64(42);
        let course = generator.generate(&mut rng);

        let item = to_item(&course);
        let rating = item.get("rating").unwrap().as_n().unwrap();
        // One fractional digit, no float noise.
        assert_eq!(rating, &course.rating.to_string());
        assert_eq!(rating.split('.').nth(1).map(str::len), Some(1));
    }

    #[test]
    fn test_missing_key_is_malformed() {
        let generator = CourseGenerator::new("TENANT_A");
        let mut rng = StdRng::seed_from_u64(42);
        let mut item = to_item(&generator.generate(&mut rng));
        item.remove("course_id");

        assert!(matches!(from_item(&item), Err(StoreError::Malformed(_))));
    }

    #[test]
    fn test_unknown_level_decodes_to_none() {
        let generator = CourseGenerator::new("TENANT_A");
        let mut rng = StdRng::seed_from_u64(42);
        let mut item = to_item(&generator.generate(&mut rng));
        item.insert(
            "level".to_string(),
            AttributeValue::S("No level".to_string()),
        );

        assert_eq!(from_item(&item).unwrap().level, None);
    }
}
