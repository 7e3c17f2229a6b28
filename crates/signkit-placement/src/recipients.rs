//! Recipient roster and field assignment.
//!
//! The roster keeps the signing sequence dense: signer orders are always
//! exactly `1..=N` for N signers, after every add, removal, role change, or
//! reorder. Reviewers and approvers carry no order.

use crate::directory::DirectoryEntry;
use crate::field_store::FieldStore;
use crate::model::{Field, FieldPatch};
use serde::{Deserialize, Serialize};
use signkit_core::constants::MAX_ID;
use signkit_core::{
    AppEvent, EventBus, FieldId, PlacementError, RecipientError, RecipientEvent, RecipientId,
};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Where a recipient comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecipientType {
    #[default]
    TeamMember,
    Customer,
}

impl fmt::Display for RecipientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipientType::TeamMember => write!(f, "team-member"),
            RecipientType::Customer => write!(f, "customer"),
        }
    }
}

impl FromStr for RecipientType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "team-member" => Ok(RecipientType::TeamMember),
            "customer" => Ok(RecipientType::Customer),
            other => Err(format!("unknown recipient type '{}'", other)),
        }
    }
}

/// What a recipient does with the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Signer,
    Reviewer,
    Approver,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Signer => write!(f, "signer"),
            Role::Reviewer => write!(f, "reviewer"),
            Role::Approver => write!(f, "approver"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signer" => Ok(Role::Signer),
            "reviewer" => Ok(Role::Reviewer),
            "approver" => Ok(Role::Approver),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A participant in the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub id: RecipientId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Key in the staff directory or customer repository.
    #[serde(default)]
    pub unique_id: String,
    #[serde(rename = "type", default)]
    pub recipient_type: RecipientType,
    #[serde(default)]
    pub role: Role,
    /// Signing position, signers only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl Recipient {
    pub fn is_signer(&self) -> bool {
        self.role == Role::Signer
    }
}

/// Ordered list of recipients.
#[derive(Debug, Clone, Default)]
pub struct RecipientRoster {
    recipients: Vec<Recipient>,
    next_id: u64,
    bus: Option<Arc<EventBus>>,
}

impl RecipientRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_bus(bus: Arc<EventBus>) -> Self {
        Self {
            bus: Some(bus),
            ..Self::default()
        }
    }

    fn publish(&self, event: RecipientEvent) {
        if let Some(bus) = &self.bus {
            let _ = bus.publish(AppEvent::Recipient(event));
        }
    }

    fn publish_order(&self) {
        self.publish(RecipientEvent::OrderChanged {
            signers: self.signing_sequence(),
        });
    }

    fn index_of(&self, id: RecipientId) -> Result<usize, RecipientError> {
        self.recipients
            .iter()
            .position(|r| r.id == id)
            .ok_or(RecipientError::NotFound { id })
    }

    fn signer_count(&self) -> u32 {
        self.recipients.iter().filter(|r| r.is_signer()).count() as u32
    }

    fn max_order(&self) -> u32 {
        self.recipients
            .iter()
            .filter(|r| r.is_signer())
            .filter_map(|r| r.order)
            .max()
            .unwrap_or(0)
    }

    /// Adds a blank signer of `recipient_type` at the end of the sequence.
    pub fn add(&mut self, recipient_type: RecipientType) -> RecipientId {
        // Imported ids are at most MAX_ID, so this cannot wrap.
        self.next_id += 1;
        let id = RecipientId(self.next_id);
        let order = self.max_order() + 1;
        self.recipients.push(Recipient {
            id,
            name: String::new(),
            email: String::new(),
            unique_id: String::new(),
            recipient_type,
            role: Role::Signer,
            order: Some(order),
        });
        tracing::debug!("Added {} ({}) as signer {}", id, recipient_type, order);
        self.publish(RecipientEvent::Added { id });
        self.publish_order();
        id
    }

    /// Fills a recipient from a directory hit and makes it a signer.
    pub fn apply_directory_entry(
        &mut self,
        id: RecipientId,
        entry: &DirectoryEntry,
    ) -> Result<&Recipient, RecipientError> {
        let index = self.index_of(id)?;
        {
            let recipient = &mut self.recipients[index];
            recipient.name = entry.name.clone();
            recipient.email = entry.email.clone();
            recipient.unique_id = entry.unique_id.clone();
        }
        self.publish(RecipientEvent::Updated { id });
        self.set_role(id, Role::Signer)?;
        Ok(&self.recipients[index])
    }

    /// Edits the contact details of a recipient.
    pub fn update_details(
        &mut self,
        id: RecipientId,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<(), RecipientError> {
        let index = self.index_of(id)?;
        let recipient = &mut self.recipients[index];
        recipient.name = name.into();
        recipient.email = email.into();
        self.publish(RecipientEvent::Updated { id });
        Ok(())
    }

    /// Changes a recipient's role.
    ///
    /// Becoming a signer appends to the sequence. Leaving the signer role
    /// clears the order and closes the gap it leaves.
    pub fn set_role(&mut self, id: RecipientId, role: Role) -> Result<(), RecipientError> {
        let index = self.index_of(id)?;
        let current = &self.recipients[index];
        let was_signer = current.is_signer();
        if current.role == role && (!was_signer || current.order.is_some()) {
            return Ok(());
        }

        let next_order = self.max_order() + 1;
        let recipient = &mut self.recipients[index];
        recipient.role = role;
        match (was_signer, role == Role::Signer) {
            (false, true) => recipient.order = Some(next_order),
            (true, true) => {
                if recipient.order.is_none() {
                    recipient.order = Some(next_order);
                }
            }
            (true, false) => {
                if let Some(old) = recipient.order.take() {
                    self.close_gap(old);
                }
            }
            (false, false) => recipient.order = None,
        }
        tracing::debug!("{} is now {}", id, role);
        self.publish(RecipientEvent::Updated { id });
        if was_signer || role == Role::Signer {
            self.publish_order();
        }
        Ok(())
    }

    // Pulls every signer after `removed` one place forward.
    fn close_gap(&mut self, removed: u32) {
        for r in self.recipients.iter_mut().filter(|r| r.is_signer()) {
            if let Some(order) = r.order.as_mut() {
                if *order > removed {
                    *order -= 1;
                }
            }
        }
    }

    /// Moves a signer to `new_order`, swapping with whoever held it.
    pub fn reorder(&mut self, id: RecipientId, new_order: u32) -> Result<(), RecipientError> {
        let index = self.index_of(id)?;
        if !self.recipients[index].is_signer() {
            return Err(RecipientError::NotASigner { id });
        }
        let max = self.signer_count();
        if new_order == 0 || new_order > max {
            return Err(RecipientError::OrderOutOfRange {
                order: new_order,
                max,
            });
        }

        let old_order = self.recipients[index].order;
        if old_order == Some(new_order) {
            return Ok(());
        }
        if let Some(holder) = self
            .recipients
            .iter_mut()
            .find(|r| r.is_signer() && r.order == Some(new_order))
        {
            holder.order = old_order;
        }
        self.recipients[index].order = Some(new_order);
        tracing::debug!("{} moved to signing position {}", id, new_order);
        self.publish_order();
        Ok(())
    }

    /// Removes a recipient, keeping signer orders dense.
    pub fn remove(&mut self, id: RecipientId) -> Result<Recipient, RecipientError> {
        let index = self.index_of(id)?;
        let removed = self.recipients.remove(index);
        if removed.is_signer() {
            if let Some(order) = removed.order {
                self.close_gap(order);
            }
        }
        tracing::debug!("Removed {}", id);
        self.publish(RecipientEvent::Removed { id });
        if removed.is_signer() {
            self.publish_order();
        }
        Ok(removed)
    }

    /// Colour token for a recipient, by list position modulo palette size.
    pub fn color_for<'p>(&self, id: RecipientId, palette: &'p [String]) -> Option<&'p str> {
        if palette.is_empty() {
            return None;
        }
        let index = self.recipients.iter().position(|r| r.id == id)?;
        Some(palette[index % palette.len()].as_str())
    }

    /// Signers in signing order.
    pub fn signers(&self) -> Vec<&Recipient> {
        let mut signers: Vec<&Recipient> =
            self.recipients.iter().filter(|r| r.is_signer()).collect();
        signers.sort_by_key(|r| r.order.unwrap_or(u32::MAX));
        signers
    }

    pub fn signing_sequence(&self) -> Vec<RecipientId> {
        self.signers().into_iter().map(|r| r.id).collect()
    }

    /// True when signer orders are exactly `1..=N`.
    pub fn orders_are_dense(&self) -> bool {
        let mut orders: Vec<u32> = self
            .recipients
            .iter()
            .filter(|r| r.is_signer())
            .map(|r| r.order.unwrap_or(0))
            .collect();
        orders.sort_unstable();
        orders.iter().zip(1u32..).all(|(o, expected)| *o == expected)
    }

    pub fn get(&self, id: RecipientId) -> Option<&Recipient> {
        self.recipients.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: RecipientId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipient> + Clone + '_ {
        self.recipients.iter()
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    /// Replaces the roster, renumbering signers into a dense sequence.
    ///
    /// Signers keep their relative order; ties and missing orders fall back
    /// to list position. Nothing changes when ids repeat or are out of range.
    pub fn replace_all(&mut self, mut recipients: Vec<Recipient>) -> Result<(), RecipientError> {
        check_ids(&recipients)?;

        let mut signers: Vec<(u32, usize)> = recipients
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_signer())
            .map(|(i, r)| (r.order.unwrap_or(u32::MAX), i))
            .collect();
        signers.sort_unstable();
        for (position, (_, index)) in signers.into_iter().enumerate() {
            recipients[index].order = Some(position as u32 + 1);
        }
        for r in recipients.iter_mut().filter(|r| !r.is_signer()) {
            r.order = None;
        }

        let highest = recipients.iter().map(|r| r.id.0).max().unwrap_or(0);
        self.next_id = self.next_id.max(highest);
        self.recipients = recipients;
        tracing::info!("Loaded {} recipients", self.recipients.len());
        self.publish_order();
        Ok(())
    }
}

/// Rejects repeated ids and ids above [`MAX_ID`].
pub(crate) fn check_ids(recipients: &[Recipient]) -> Result<(), RecipientError> {
    let mut seen = HashSet::new();
    for recipient in recipients {
        if recipient.id.0 > MAX_ID {
            return Err(RecipientError::validation(format!(
                "{} is out of range",
                recipient.id
            )));
        }
        if !seen.insert(recipient.id) {
            return Err(RecipientError::validation(format!(
                "duplicate id {}",
                recipient.id
            )));
        }
    }
    Ok(())
}

/// Assigns a field to a recipient, or unassigns it with `None`.
pub fn assign(
    store: &mut FieldStore,
    field_id: FieldId,
    recipient_id: Option<RecipientId>,
) -> Result<&Field, PlacementError> {
    store.update(field_id, FieldPatch::recipient(recipient_id))
}
