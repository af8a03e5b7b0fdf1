use super::memory::{lock, read, write, MemoryStore};
use super::validate_name;
use crate::error::Resource;
use crate::ledger::{round_rate, DepositoTypeId, Rate};
use crate::Error;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A deposit product; its yearly return drives interest on every account of
/// this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositoType {
    pub id: DepositoTypeId,
    pub name: String,
    pub yearly_return: Rate,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDepositoType {
    pub name: String,
    pub yearly_return: Rate,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositoTypeUpdate {
    pub name: Option<String>,
    pub yearly_return: Option<Rate>,
}

/// Yearly returns are fractions between 0 and 1, kept at six decimal places.
fn validate_yearly_return(yearly_return: Rate) -> Result<Rate, Error> {
    if yearly_return < Decimal::ZERO || yearly_return > Decimal::ONE {
        return Err(Error::InvalidInput(format!(
            "yearly return must be between 0 and 1, got {yearly_return}"
        )));
    }

    Ok(round_rate(yearly_return))
}

fn ensure_unique_name(
    deposito_types: &HashMap<DepositoTypeId, DepositoType>,
    name: &str,
    except: Option<DepositoTypeId>,
) -> Result<(), Error> {
    let taken = deposito_types
        .values()
        .any(|deposito_type| deposito_type.name == name && Some(deposito_type.id) != except);
    if taken {
        return Err(Error::Conflict(format!(
            "a deposito type named `{name}` already exists"
        )));
    }

    Ok(())
}

impl MemoryStore {
    /// List deposito types ordered by name.
    pub fn list_deposito_types(&self) -> Result<Vec<DepositoType>, Error> {
        let mut deposito_types: Vec<DepositoType> = read(&self.deposito_types, "deposito type")?
            .values()
            .cloned()
            .collect();
        deposito_types.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(deposito_types)
    }

    pub fn get_deposito_type(&self, deposito_type_id: DepositoTypeId) -> Result<DepositoType, Error> {
        read(&self.deposito_types, "deposito type")?
            .get(&deposito_type_id)
            .cloned()
            .ok_or_else(|| Error::not_found(Resource::DepositoType, deposito_type_id))
    }

    pub fn create_deposito_type(
        &self,
        new_deposito_type: NewDepositoType,
    ) -> Result<DepositoType, Error> {
        validate_name("Name", &new_deposito_type.name)?;
        let yearly_return = validate_yearly_return(new_deposito_type.yearly_return)?;

        let mut deposito_types = write(&self.deposito_types, "deposito type")?;
        ensure_unique_name(&deposito_types, &new_deposito_type.name, None)?;

        let deposito_type = DepositoType {
            id: uuid::Uuid::new_v4(),
            name: new_deposito_type.name,
            yearly_return,
        };
        deposito_types.insert(deposito_type.id, deposito_type.clone());
        tracing::info!(
            deposito_type_id = %deposito_type.id,
            %yearly_return,
            "created deposito type"
        );

        Ok(deposito_type)
    }

    /// Update a deposito type. A new yearly return applies to every later
    /// withdrawal of the accounts of that type.
    pub fn update_deposito_type(
        &self,
        deposito_type_id: DepositoTypeId,
        update: DepositoTypeUpdate,
    ) -> Result<DepositoType, Error> {
        if let Some(name) = &update.name {
            validate_name("Name", name)?;
        }
        let yearly_return = update.yearly_return.map(validate_yearly_return).transpose()?;

        let mut deposito_types = write(&self.deposito_types, "deposito type")?;
        if !deposito_types.contains_key(&deposito_type_id) {
            return Err(Error::not_found(Resource::DepositoType, deposito_type_id));
        }
        if let Some(name) = &update.name {
            ensure_unique_name(&deposito_types, name, Some(deposito_type_id))?;
        }

        let deposito_type = deposito_types
            .get_mut(&deposito_type_id)
            .ok_or_else(|| Error::not_found(Resource::DepositoType, deposito_type_id))?;
        if let Some(name) = update.name {
            deposito_type.name = name;
        }
        if let Some(yearly_return) = yearly_return {
            tracing::info!(
                %deposito_type_id,
                from = %deposito_type.yearly_return,
                to = %yearly_return,
                "yearly return changed"
            );
            deposito_type.yearly_return = yearly_return;
        }

        Ok(deposito_type.clone())
    }

    /// Delete a deposito type no account refers to anymore.
    pub fn delete_deposito_type(&self, deposito_type_id: DepositoTypeId) -> Result<(), Error> {
        let mut deposito_types = write(&self.deposito_types, "deposito type")?;
        if !deposito_types.contains_key(&deposito_type_id) {
            return Err(Error::not_found(Resource::DepositoType, deposito_type_id));
        }

        let accounts = read(&self.accounts, "account map")?;
        for entry in accounts.values() {
            if lock(entry)?.account.deposito_type_id == deposito_type_id {
                return Err(Error::Conflict(format!(
                    "deposito type {deposito_type_id} is still used by accounts"
                )));
            }
        }

        deposito_types.remove(&deposito_type_id);
        tracing::info!(%deposito_type_id, "deleted deposito type");

        Ok(())
    }
}
