use super::memory::{lock, read, write, MemoryStore};
use super::validate_name;
use crate::error::Resource;
use crate::ledger::CustomerId;
use crate::Error;

use serde::{Deserialize, Serialize};

/// A bank customer owning savings accounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    pub name: String,
}

/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
}

impl MemoryStore {
    /// List customers ordered by name.
    pub fn list_customers(&self) -> Result<Vec<Customer>, Error> {
        let mut customers: Vec<Customer> = read(&self.customers, "customer")?
            .values()
            .cloned()
            .collect();
        customers.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(customers)
    }

    pub fn get_customer(&self, customer_id: CustomerId) -> Result<Customer, Error> {
        read(&self.customers, "customer")?
            .get(&customer_id)
            .cloned()
            .ok_or_else(|| Error::not_found(Resource::Customer, customer_id))
    }

    pub fn create_customer(&self, new_customer: NewCustomer) -> Result<Customer, Error> {
        validate_name("Name", &new_customer.name)?;

        let customer = Customer {
            id: uuid::Uuid::new_v4(),
            name: new_customer.name,
        };
        write(&self.customers, "customer")?.insert(customer.id, customer.clone());
        tracing::info!(customer_id = %customer.id, "created customer");

        Ok(customer)
    }

    pub fn update_customer(
        &self,
        customer_id: CustomerId,
        update: CustomerUpdate,
    ) -> Result<Customer, Error> {
        if let Some(name) = &update.name {
            validate_name("Name", name)?;
        }

        let mut customers = write(&self.customers, "customer")?;
        let customer = customers
            .get_mut(&customer_id)
            .ok_or_else(|| Error::not_found(Resource::Customer, customer_id))?;
        if let Some(name) = update.name {
            customer.name = name;
        }

        Ok(customer.clone())
    }

    /// Delete a customer together with their accounts.
    ///
    /// Accounts that have ledger entries can't be deleted, so a customer
    /// owning one is kept and a conflict is reported instead.
    pub fn delete_customer(&self, customer_id: CustomerId) -> Result<(), Error> {
        let mut customers = write(&self.customers, "customer")?;
        if !customers.contains_key(&customer_id) {
            return Err(Error::not_found(Resource::Customer, customer_id));
        }

        let mut accounts = write(&self.accounts, "account map")?;
        let mut owned = Vec::new();
        for (account_id, entry) in accounts.iter() {
            let entry = lock(entry)?;
            if entry.account.customer_id != customer_id {
                continue;
            }
            if !entry.transactions.is_empty() {
                return Err(Error::Conflict(format!(
                    "account {account_id} of customer {customer_id} has transactions"
                )));
            }
            owned.push(*account_id);
        }

        for account_id in &owned {
            accounts.remove(account_id);
        }
        customers.remove(&customer_id);
        tracing::info!(%customer_id, accounts = owned.len(), "deleted customer");

        Ok(())
    }
}
