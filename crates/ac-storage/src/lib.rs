use ac_api_types::{Artwork, ArtworkDraft, WalletAddress};
use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, info};

/// Local-storage key holding the last connected address.
pub const WALLET_ADDRESS_KEY: &str = "walletAddress";

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const CATEGORY_ATTRIBUTE: &str = "category";
pub const VERSION_ATTRIBUTE: &str = "version";
/// Category every artwork record is filed under.
pub const ARTWORK_CATEGORY: &str = "documentation";
pub const RECORD_VERSION: &str = "1.0";
pub const RECORD_EXPIRY_SECS: u64 = 30 * 24 * 60 * 60;

/// Synchronous string store that survives reloads (browser localStorage).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    values: Rc<RefCell<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

// ── Managed data network ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntity {
    pub payload: Value,
    pub content_type: String,
    pub attributes: Vec<Attribute>,
    pub expires_in_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEntity {
    pub key: String,
    pub payload: Value,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityUpdate {
    pub key: String,
    pub payload: Value,
    pub content_type: String,
    pub attributes: Vec<Attribute>,
    pub expires_in_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReceipt {
    pub entity_key: String,
    #[serde(default)]
    pub tx_hash: Option<String>,
}

/// Client side of the managed data network used as a JSON record store.
#[async_trait(?Send)]
pub trait EntityStore {
    async fn create_entity(&self, entity: NewEntity) -> Result<EntityReceipt>;
    /// Every entity carrying all of `filter`'s attributes.
    async fn query_entities(&self, filter: &[Attribute]) -> Result<Vec<StoredEntity>>;
    async fn update_entity(&self, update: EntityUpdate) -> Result<EntityReceipt>;
}

#[async_trait(?Send)]
impl<E: EntityStore + ?Sized> EntityStore for Rc<E> {
    async fn create_entity(&self, entity: NewEntity) -> Result<EntityReceipt> {
        (**self).create_entity(entity).await
    }

    async fn query_entities(&self, filter: &[Attribute]) -> Result<Vec<StoredEntity>> {
        (**self).query_entities(filter).await
    }

    async fn update_entity(&self, update: EntityUpdate) -> Result<EntityReceipt> {
        (**self).update_entity(update).await
    }
}

#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    entities: RefCell<Vec<StoredEntity>>,
    next_key: Cell<u64>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record as another client would have written it.
    pub fn seed(&self, payload: Value, attributes: Vec<Attribute>) -> String {
        let key = self.allocate_key();
        self.entities.borrow_mut().push(StoredEntity {
            key: key.clone(),
            payload,
            content_type: JSON_CONTENT_TYPE.to_owned(),
            attributes,
        });
        key
    }

    pub fn get(&self, key: &str) -> Option<StoredEntity> {
        self.entities.borrow().iter().find(|e| e.key == key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entities.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.borrow().is_empty()
    }

    fn allocate_key(&self) -> String {
        let n = self.next_key.get() + 1;
        self.next_key.set(n);
        format!("0x{n:064x}")
    }
}

#[async_trait(?Send)]
impl EntityStore for InMemoryEntityStore {
    async fn create_entity(&self, entity: NewEntity) -> Result<EntityReceipt> {
        let key = self.allocate_key();
        self.entities.borrow_mut().push(StoredEntity {
            key: key.clone(),
            payload: entity.payload,
            content_type: entity.content_type,
            attributes: entity.attributes,
        });
        Ok(EntityReceipt {
            entity_key: key,
            tx_hash: None,
        })
    }

    async fn query_entities(&self, filter: &[Attribute]) -> Result<Vec<StoredEntity>> {
        Ok(self
            .entities
            .borrow()
            .iter()
            .filter(|e| filter.iter().all(|f| e.attributes.contains(f)))
            .cloned()
            .collect())
    }

    async fn update_entity(&self, update: EntityUpdate) -> Result<EntityReceipt> {
        let mut entities = self.entities.borrow_mut();
        let Some(entity) = entities.iter_mut().find(|e| e.key == update.key) else {
            bail!("entity {} not found", update.key);
        };
        entity.payload = update.payload;
        entity.content_type = update.content_type;
        entity.attributes = update.attributes;
        Ok(EntityReceipt {
            entity_key: update.key,
            tx_hash: None,
        })
    }
}

// ── Artwork records ──────────────────────────────────────────────────

/// Where the record's fields live in its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// `{ nftId, creator, likes, .. }`
    Flat,
    /// `{ "entity": { nftId, creator, likes, .. } }`
    Nested,
}

/// Artwork metadata and like count as stored on the data network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkRecord {
    pub nft_id: u64,
    pub creator: WalletAddress,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_uri: Option<String>,
    pub likes: u64,
    pub shape: RecordShape,
}

/// Counts and ids are written as JSON numbers or decimal strings.
fn count_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn id_field(fields: &Map<String, Value>) -> Option<u64> {
    ["nftId", "entityId", "id"]
        .iter()
        .filter_map(|k| fields.get(*k))
        .find_map(count_value)
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn record_fields(payload: &Value) -> Option<(&Map<String, Value>, RecordShape)> {
    let root = payload.as_object()?;
    match root.get("entity").and_then(Value::as_object) {
        Some(inner) => Some((inner, RecordShape::Nested)),
        None => Some((root, RecordShape::Flat)),
    }
}

impl ArtworkRecord {
    /// Read either record shape. Payloads without an id or creator are not artwork records.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let (fields, shape) = record_fields(payload)?;
        Some(Self {
            nft_id: id_field(fields)?,
            creator: WalletAddress(text_field(fields, "creator")?),
            title: text_field(fields, "title"),
            description: text_field(fields, "description"),
            image_uri: text_field(fields, "imageURI"),
            likes: fields.get("likes").and_then(count_value).unwrap_or(0),
            shape,
        })
    }

    pub fn matches(&self, artwork: &Artwork) -> bool {
        if self.nft_id != artwork.id || !self.creator.same_as(&artwork.artist) {
            return false;
        }
        match &self.image_uri {
            Some(uri) => *uri == artwork.image_uri,
            None => true,
        }
    }

    /// Copy of `payload` with the like count replaced, in the payload's own shape.
    pub fn payload_with_likes(payload: &Value, likes: u64) -> Value {
        let mut payload = payload.clone();
        let nested = payload.get("entity").is_some_and(Value::is_object);
        let target = if nested {
            &mut payload["entity"]
        } else {
            &mut payload
        };
        if let Some(fields) = target.as_object_mut() {
            fields.insert("likes".to_owned(), json!(likes));
        }
        payload
    }
}

/// Nested-shape record created when an artwork is listed.
pub fn listing_entity(nft_id: u64, creator: &WalletAddress, draft: &ArtworkDraft) -> NewEntity {
    NewEntity {
        payload: json!({
            "entity": {
                "nftId": nft_id,
                "entityId": nft_id,
                "creator": creator.as_str(),
                "title": draft.title,
                "description": draft.description,
                "imageURI": draft.image_uri,
                "likes": 0,
            }
        }),
        content_type: JSON_CONTENT_TYPE.to_owned(),
        attributes: artwork_attributes(),
        expires_in_secs: RECORD_EXPIRY_SECS,
    }
}

pub fn artwork_attributes() -> Vec<Attribute> {
    vec![
        Attribute::new(CATEGORY_ATTRIBUTE, ARTWORK_CATEGORY),
        Attribute::new(VERSION_ATTRIBUTE, RECORD_VERSION),
    ]
}

/// Every stored record for `artwork`, whichever shape it was written in.
pub fn find_matches(entities: &[StoredEntity], artwork: &Artwork) -> Vec<(StoredEntity, ArtworkRecord)> {
    entities
        .iter()
        .filter_map(|e| ArtworkRecord::from_payload(&e.payload).map(|r| (e, r)))
        .filter(|(_, r)| r.matches(artwork))
        .map(|(e, r)| (e.clone(), r))
        .collect()
}

pub async fn create_listing_record<E: EntityStore + ?Sized>(
    store: &E,
    nft_id: u64,
    creator: &WalletAddress,
    draft: &ArtworkDraft,
) -> Result<EntityReceipt> {
    let receipt = store
        .create_entity(listing_entity(nft_id, creator, draft))
        .await?;
    info!(nft_id, entity = %receipt.entity_key, "artwork record created");
    Ok(receipt)
}

/// Add one like to the first record matching `artwork`. Returns the new count.
pub async fn record_like<E: EntityStore + ?Sized>(store: &E, artwork: &Artwork) -> Result<u64> {
    let filter = [Attribute::new(CATEGORY_ATTRIBUTE, ARTWORK_CATEGORY)];
    let entities = store.query_entities(&filter).await?;
    let matches = find_matches(&entities, artwork);
    debug!(artwork = artwork.id, matches = matches.len(), "like lookup");

    let Some((entity, record)) = matches.into_iter().next() else {
        bail!("no stored record found for artwork {}", artwork.id);
    };

    let likes = record.likes + 1;
    let attributes = if entity.attributes.is_empty() {
        artwork_attributes()
    } else {
        entity.attributes.clone()
    };
    let content_type = if entity.content_type.is_empty() {
        JSON_CONTENT_TYPE.to_owned()
    } else {
        entity.content_type.clone()
    };

    store
        .update_entity(EntityUpdate {
            key: entity.key.clone(),
            payload: ArtworkRecord::payload_with_likes(&entity.payload, likes),
            content_type,
            attributes,
            expires_in_secs: RECORD_EXPIRY_SECS,
        })
        .await?;
    info!(artwork = artwork.id, likes, "like recorded");
    Ok(likes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTIST: &str = "0x00000000000000000000000000000000000000aa";

    fn artwork(id: u64) -> Artwork {
        Artwork {
            id,
            artist: WalletAddress::new(ARTIST),
            image_uri: format!("ipfs://art-{id}"),
        }
    }

    #[test]
    fn reads_flat_and_nested_records() {
        let flat = json!({ "nftId": "5", "creator": ARTIST, "likes": 2 });
        let nested = json!({ "entity": { "entityId": 5, "creator": ARTIST, "imageURI": "ipfs://art-5" } });

        let a = ArtworkRecord::from_payload(&flat).unwrap();
        let b = ArtworkRecord::from_payload(&nested).unwrap();
        assert_eq!((a.nft_id, a.likes, a.shape), (5, 2, RecordShape::Flat));
        assert_eq!((b.nft_id, b.likes, b.shape), (5, 0, RecordShape::Nested));
        assert!(a.matches(&artwork(5)));
        assert!(b.matches(&artwork(5)));
    }

    #[test]
    fn matching_checks_creator_and_image() {
        let upper = json!({ "nftId": 5, "creator": ARTIST.to_ascii_uppercase().replace("0X", "0x") });
        assert!(ArtworkRecord::from_payload(&upper).unwrap().matches(&artwork(5)));

        let other_image = json!({ "nftId": 5, "creator": ARTIST, "imageURI": "ipfs://elsewhere" });
        assert!(!ArtworkRecord::from_payload(&other_image).unwrap().matches(&artwork(5)));

        let other_id = json!({ "nftId": 6, "creator": ARTIST });
        assert!(!ArtworkRecord::from_payload(&other_id).unwrap().matches(&artwork(5)));

        assert!(ArtworkRecord::from_payload(&json!({ "creator": ARTIST })).is_none());
    }

    #[test]
    fn find_matches_returns_both_shapes() {
        let store = InMemoryEntityStore::new();
        store.seed(json!({ "nftId": 5, "creator": ARTIST }), artwork_attributes());
        store.seed(json!({ "entity": { "nftId": 5, "creator": ARTIST } }), artwork_attributes());
        store.seed(json!({ "entity": { "nftId": 9, "creator": ARTIST } }), artwork_attributes());

        let entities = store.entities.borrow().clone();
        let found = find_matches(&entities, &artwork(5));
        let shapes: Vec<_> = found.iter().map(|(_, r)| r.shape).collect();
        assert_eq!(shapes, vec![RecordShape::Flat, RecordShape::Nested]);
    }

    #[tokio::test]
    async fn like_increments_first_match_in_its_own_shape() -> anyhow::Result<()> {
        let store = InMemoryEntityStore::new();
        let first = store.seed(
            json!({ "entity": { "nftId": 5, "creator": ARTIST, "likes": 3, "title": "Dusk" } }),
            artwork_attributes(),
        );
        let second = store.seed(json!({ "nftId": 5, "creator": ARTIST, "likes": 7 }), artwork_attributes());

        let likes = record_like(&store, &artwork(5)).await?;
        assert_eq!(likes, 4);

        let updated = store.get(&first).unwrap().payload;
        assert_eq!(updated["entity"]["likes"], json!(4));
        assert_eq!(updated["entity"]["title"], json!("Dusk"));
        assert!(updated.get("likes").is_none());
        assert_eq!(store.get(&second).unwrap().payload["likes"], json!(7));
        Ok(())
    }

    #[tokio::test]
    async fn like_keeps_counts_stored_as_strings() -> anyhow::Result<()> {
        let store = InMemoryEntityStore::new();
        let key = store.seed(
            json!({ "nftId": "5", "creator": ARTIST, "imageURI": "ipfs://art-5", "likes": "5" }),
            artwork_attributes(),
        );

        assert_eq!(record_like(&store, &artwork(5)).await?, 6);
        assert_eq!(store.get(&key).unwrap().payload["likes"], json!(6));

        let garbled = json!({ "nftId": 5, "creator": ARTIST, "likes": "many" });
        assert_eq!(ArtworkRecord::from_payload(&garbled).unwrap().likes, 0);
        Ok(())
    }

    #[tokio::test]
    async fn like_without_record_fails() -> anyhow::Result<()> {
        let store = InMemoryEntityStore::new();
        store.seed(json!({ "nftId": 5, "creator": ARTIST }), vec![Attribute::new("category", "other")]);

        let err = record_like(&store, &artwork(5)).await.unwrap_err();
        assert!(err.to_string().contains("no stored record"));
        Ok(())
    }

    #[tokio::test]
    async fn listing_record_is_nested_and_categorised() -> anyhow::Result<()> {
        let store = InMemoryEntityStore::new();
        let draft = ArtworkDraft {
            title: "Dusk".to_owned(),
            description: "oil".to_owned(),
            image_uri: "ipfs://art-12".to_owned(),
        };
        let receipt = create_listing_record(&store, 12, &WalletAddress::new(ARTIST), &draft).await?;

        let stored = store.get(&receipt.entity_key).unwrap();
        assert_eq!(stored.payload["entity"]["nftId"], json!(12));
        assert_eq!(stored.payload["entity"]["likes"], json!(0));
        assert_eq!(stored.content_type, JSON_CONTENT_TYPE);
        assert!(stored.attributes.contains(&Attribute::new("category", "documentation")));

        let record = ArtworkRecord::from_payload(&stored.payload).unwrap();
        assert!(record.matches(&artwork(12)));
        Ok(())
    }

    #[test]
    fn key_value_store_round_trip() -> anyhow::Result<()> {
        let store = InMemoryKeyValueStore::new();
        store.set(WALLET_ADDRESS_KEY, ARTIST)?;
        assert_eq!(store.get(WALLET_ADDRESS_KEY).as_deref(), Some(ARTIST));
        store.remove(WALLET_ADDRESS_KEY)?;
        assert!(store.get(WALLET_ADDRESS_KEY).is_none());
        Ok(())
    }
}
