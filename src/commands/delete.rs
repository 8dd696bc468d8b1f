use crate::args::DeleteArgs;
use crate::commands::Out;
use crate::db::Store;
use crate::error::{ErrorType, IntoResult};
use crate::model::ItemId;
use crate::{Config, Error, Result};
use anyhow::anyhow;

/// Removes a single item from the stored inventory.
pub async fn delete(config: Config, args: DeleteArgs) -> Result<Out<ItemId>> {
    let id = ItemId::from(args.id());
    let deleted = config
        .db()
        .delete(&id)
        .await
        .pub_result(ErrorType::Database)?;
    if !deleted {
        return Err(Error::new(
            ErrorType::Request,
            anyhow!("There is no item with id '{id}'"),
        ));
    }
    Ok(Out::new(format!("Deleted item {id}"), id))
}
