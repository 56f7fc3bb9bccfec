// ============================
// contacts-backend-lib/src/contacts.rs
// ============================
//! Per-identity contact storage.
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use contacts_common::{Contact, ContactCreate, ContactUpdate};
use dashmap::DashMap;

/// In-memory contact book; every operation is scoped to one owner identity
#[derive(Debug)]
pub struct ContactBook {
    books: DashMap<String, BTreeMap<u64, Contact>>,
    next_id: AtomicU64,
}

impl Default for ContactBook {
    fn default() -> Self {
        Self {
            books: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl ContactBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// All contacts of `owner`, ordered by id
    pub fn list(&self, owner: &str) -> Vec<Contact> {
        self.books
            .get(owner)
            .map(|book| book.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn get(&self, owner: &str, id: u64) -> Option<Contact> {
        self.books.get(owner)?.get(&id).cloned()
    }

    pub fn create(&self, owner: &str, item: ContactCreate) -> Contact {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let contact = Contact {
            id,
            first_name: item.first_name,
            last_name: item.last_name.unwrap_or_default(),
            email: item.email,
            phone_number: item.phone_number.unwrap_or_default(),
            birthday: item.birthday,
            favorite: item.favorite.unwrap_or(false),
        };
        self.books
            .entry(owner.to_string())
            .or_default()
            .insert(id, contact.clone());
        contact
    }

    /// Apply the fields present in `item`; `None` when `id` is not owned by `owner`
    pub fn update(&self, owner: &str, id: u64, item: ContactUpdate) -> Option<Contact> {
        let mut book = self.books.get_mut(owner)?;
        let contact = book.get_mut(&id)?;

        if let Some(first_name) = item.first_name {
            contact.first_name = first_name;
        }
        if let Some(last_name) = item.last_name {
            contact.last_name = last_name;
        }
        if let Some(email) = item.email {
            contact.email = Some(email);
        }
        if let Some(phone_number) = item.phone_number {
            contact.phone_number = phone_number;
        }
        if let Some(birthday) = item.birthday {
            contact.birthday = Some(birthday);
        }
        if let Some(favorite) = item.favorite {
            contact.favorite = favorite;
        }
        Some(contact.clone())
    }

    pub fn remove(&self, owner: &str, id: u64) -> Option<Contact> {
        self.books.get_mut(owner)?.remove(&id)
    }
}
