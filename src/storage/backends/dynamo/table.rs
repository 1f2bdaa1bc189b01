use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::Credentials;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_dynamodb::types::AttributeValue as Av;
use async_trait::async_trait;
use tracing::{debug, warn};

use super::ShortieTable;
use super::converters::{ATTR_EXPIRATION, ATTR_SHORT_ID, item_to_record, record_to_item};
use crate::config::DynamoDbConfig;
use crate::errors::{Result, ShortieError};
use crate::storage::ShortieRecord;

const CONDITIONAL_CHECK_FAILED: &str = "ConditionalCheckFailedException";

/// 基于 aws-sdk-dynamodb 的表访问
///
/// 表需事先创建好：主键为字符串属性 `shortID`，本服务不负责建表。
#[derive(Clone)]
pub struct DynamoTable {
    client: Client,
    table_name: String,
}

impl DynamoTable {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// 按配置构建客户端
    ///
    /// 未显式配置的 region / 凭证交给 SDK 默认链解析。
    pub async fn connect(config: &DynamoDbConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = config.region.clone().filter(|r| !r.is_empty()) {
            loader = loader.region(Region::new(region));
        }
        if let Some(endpoint) = config.resolve_endpoint() {
            debug!("DynamoDB endpoint override: {}", endpoint);
            loader = loader.endpoint_url(endpoint);
        }
        match (&config.access_key_id, &config.secret_access_key) {
            (Some(key_id), Some(secret)) if !key_id.is_empty() => {
                loader = loader.credentials_provider(Credentials::new(
                    key_id.clone(),
                    secret.clone(),
                    None,
                    None,
                    "shortie-config",
                ));
            }
            (Some(_), None) | (None, Some(_)) => {
                warn!(
                    "Only one of access_key_id / secret_access_key is configured, \
                     falling back to the default credential chain"
                );
            }
            _ => {}
        }

        let sdk_config = loader.load().await;
        if sdk_config.region().is_none() {
            return Err(ShortieError::storage_config(
                "no AWS region configured: set storage.dynamodb.region or AWS_REGION",
            ));
        }

        Ok(Self::new(Client::new(&sdk_config), &config.table_name))
    }
}

#[async_trait]
impl ShortieTable for DynamoTable {
    async fn put_if_vacant(&self, record: &ShortieRecord, now: i64) -> Result<bool> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record_to_item(record)))
            .condition_expression(
                "attribute_not_exists(#shortID) OR (#expiration > :zero AND #expiration <= :now)",
            )
            .expression_attribute_names("#shortID", ATTR_SHORT_ID)
            .expression_attribute_names("#expiration", ATTR_EXPIRATION)
            .expression_attribute_values(":zero", Av::N("0".to_string()))
            .expression_attribute_values(":now", Av::N(now.to_string()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if e.code() == Some(CONDITIONAL_CHECK_FAILED) => Ok(false),
            Err(e) => Err(ShortieError::storage_operation(format!(
                "failed to save a url: {}",
                DisplayErrorContext(&e)
            ))),
        }
    }

    async fn put(&self, record: &ShortieRecord) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record_to_item(record)))
            .send()
            .await
            .map_err(|e| {
                ShortieError::storage_operation(format!(
                    "failed to write url object: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<ShortieRecord>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ATTR_SHORT_ID, Av::S(id.to_string()))
            .send()
            .await
            .map_err(|e| {
                ShortieError::storage_operation(format!(
                    "failed to read a shortID: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        match output.item {
            Some(item) => item_to_record(&item).map(Some),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(ATTR_SHORT_ID, Av::S(id.to_string()))
            .send()
            .await
            .map_err(|e| {
                ShortieError::storage_operation(format!(
                    "failed to delete a url object: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }
}
