use mongodb::{bson::doc, Database, IndexModel};

use crate::error::StoreError;
use crate::models::InstrumentClass;

use super::mongo_store::{collection_name, CHANNELS};

pub async fn ensure_indexes(db: &Database) -> Result<(), StoreError> {
    // alerts: guild listings and purges scan by guild
    for class in InstrumentClass::ALL {
        let col = db.collection::<mongodb::bson::Document>(collection_name(class));
        let model = IndexModel::builder()
            .keys(doc! { "guild_id": 1, "created_at": 1 })
            .build();

        col.create_index(model, None).await?;
    }

    // channels: sweep every binding of a guild
    {
        let col = db.collection::<mongodb::bson::Document>(CHANNELS);
        let model = IndexModel::builder()
            .keys(doc! { "guild_id": 1 })
            .build();

        col.create_index(model, None).await?;
    }

    Ok(())
}
