use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, SurveyError};

use super::fields;
use super::model::{FieldValue, SurveyDataset, SurveyRow};

// ---------------------------------------------------------------------------
// Filter selection: which values are allowed per column
// ---------------------------------------------------------------------------

/// Per-column allow-lists over the filterable demographic fields.
///
/// * column absent → unconstrained, every value passes
/// * column present with an empty set → nothing passes
/// * otherwise → the row's value must be in the set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    allowed: BTreeMap<String, BTreeSet<FieldValue>>,
}

impl FilterSelection {
    /// No constraints at all (the reset state).
    pub fn unconstrained() -> Self {
        Self::default()
    }

    /// Every observed value selected for every filterable column.
    /// Selects the same rows as [`FilterSelection::unconstrained`] but gives
    /// the UI a concrete set to toggle values in and out of.
    pub fn all_selected(dataset: &SurveyDataset) -> Self {
        let allowed = dataset
            .unique_values
            .iter()
            .filter(|(col, _)| fields::is_filterable(col))
            .map(|(col, vals)| (col.clone(), vals.clone()))
            .collect();
        FilterSelection { allowed }
    }

    /// Replace the allow-list for `field`.
    pub fn restrict<I>(&mut self, field: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = FieldValue>,
    {
        ensure_filterable(field)?;
        self.allowed
            .insert(field.to_string(), values.into_iter().collect());
        Ok(())
    }

    /// Builder-style [`FilterSelection::restrict`].
    pub fn with<I>(mut self, field: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = FieldValue>,
    {
        self.restrict(field, values)?;
        Ok(self)
    }

    /// Drop the constraint on `field` entirely.
    pub fn release(&mut self, field: &str) {
        self.allowed.remove(field);
    }

    /// Add `value` to the allow-list, or take it out if already there.
    /// An unconstrained column starts from an empty set.
    pub fn toggle(&mut self, field: &str, value: &FieldValue) -> Result<()> {
        ensure_filterable(field)?;
        let selected = self.allowed.entry(field.to_string()).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        Ok(())
    }

    /// The allow-list for `field`, `None` when unconstrained.
    pub fn allowed(&self, field: &str) -> Option<&BTreeSet<FieldValue>> {
        self.allowed.get(field)
    }

    pub fn is_selected(&self, field: &str, value: &FieldValue) -> bool {
        self.allowed
            .get(field)
            .map_or(true, |selected| selected.contains(value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<FieldValue>)> {
        self.allowed.iter()
    }

    /// Whether `row` passes every constraint.
    pub fn matches(&self, row: &SurveyRow) -> bool {
        self.allowed
            .iter()
            .all(|(col, selected)| selected.contains(row.get(col)))
    }
}

fn ensure_filterable(field: &str) -> Result<()> {
    if fields::is_filterable(field) {
        Ok(())
    } else {
        Err(SurveyError::NotFilterable(field.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Read-only subset of a dataset, as row indices in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a SurveyDataset,
    indices: Vec<usize>,
}

/// Two views are equal when they select the same rows of the same dataset.
impl PartialEq for FilteredView<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.dataset, other.dataset) && self.indices == other.indices
    }
}

impl<'a> FilteredView<'a> {
    /// A view over every row.
    pub fn all(dataset: &'a SurveyDataset) -> Self {
        FilteredView {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    pub fn dataset(&self) -> &'a SurveyDataset {
        self.dataset
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a SurveyRow> + '_ {
        let rows = &self.dataset.rows;
        self.indices.iter().map(move |&i| &rows[i])
    }
}

/// Return the rows that pass every constraint in `selection`.
///
/// Logical AND across columns, OR within a column's allow-list. A column
/// whose allow-list holds every observed value is skipped. Fails only when
/// the selection names a column the dataset does not have.
pub fn apply_filters<'a>(
    dataset: &'a SurveyDataset,
    selection: &FilterSelection,
) -> Result<FilteredView<'a>> {
    let mut active = Vec::new();
    for (col, selected) in selection.iter() {
        if !dataset.schema.contains(col) {
            return Err(SurveyError::UnknownField(col.clone()));
        }
        if let Some(all_vals) = dataset.unique_values.get(col) {
            if all_vals.is_subset(selected) {
                continue; // everything selected, no filtering needed
            }
        }
        active.push((col.as_str(), selected));
    }

    let indices: Vec<usize> = dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            active
                .iter()
                .all(|(col, selected)| selected.contains(row.get(col)))
        })
        .map(|(i, _)| i)
        .collect();

    log::debug!(
        "Filter kept {} of {} responses ({} active constraints)",
        indices.len(),
        dataset.len(),
        active.len()
    );

    Ok(FilteredView { dataset, indices })
}
