use super::{MessageStore, StoreError};
use crate::models::Message;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct State {
    rows: BTreeMap<i64, String>,
    fail_with: Option<String>,
}

/// Map-backed store. Ids are handed out as one past the largest stored id.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages(messages: impl IntoIterator<Item = Message>) -> Self {
        let store = Self::new();
        {
            let mut state = store.lock();
            for m in messages {
                state.rows.insert(m.id, m.text);
            }
        }
        store
    }

    /// Makes every later call fail with [`StoreError::Unavailable`].
    pub fn fail_all(&self, reason: impl Into<String>) {
        self.lock().fail_with = Some(reason.into());
    }

    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn checked(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        let state = self.lock();
        if let Some(reason) = &state.fail_with {
            return Err(StoreError::Unavailable(reason.clone().into()));
        }
        Ok(state)
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn create(&self, msg: &mut Message) -> Result<(), StoreError> {
        let mut state = self.checked()?;
        if msg.has_assigned_id() {
            if state.rows.contains_key(&msg.id) {
                return Err(StoreError::ConstraintViolation(
                    format!("duplicate id {}", msg.id).into(),
                ));
            }
        } else {
            msg.id = match state.rows.keys().next_back() {
                None => 1,
                Some(last) => last
                    .checked_add(1)
                    .ok_or_else(|| StoreError::Failure("id space exhausted".into()))?,
            };
        }
        state.rows.insert(msg.id, msg.text.clone());
        Ok(())
    }

    async fn read(&self, id: i64) -> Result<Message, StoreError> {
        let state = self.checked()?;
        state
            .rows
            .get(&id)
            .map(|text| Message::with_id(id, text.clone()))
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, msg: &Message) -> Result<(), StoreError> {
        let mut state = self.checked()?;
        if let Some(text) = state.rows.get_mut(&msg.id) {
            *text = msg.text.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.checked()?.rows.remove(&id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Message>, StoreError> {
        let state = self.checked()?;
        Ok(state
            .rows
            .iter()
            .map(|(id, text)| Message::with_id(*id, text.clone()))
            .collect())
    }
}
