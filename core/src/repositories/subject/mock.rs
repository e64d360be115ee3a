//! In-memory implementation of SubjectRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::DomainError;

use super::r#trait::SubjectRepository;

/// In-memory subject repository for testing
pub struct InMemorySubjectRepository<S> {
    subjects: HashMap<String, S>,
}

impl<S> InMemorySubjectRepository<S> {
    /// Builds a repository from `(identity, subject)` pairs.
    pub fn new(subjects: impl IntoIterator<Item = (String, S)>) -> Self {
        Self {
            subjects: subjects.into_iter().collect(),
        }
    }
}

#[async_trait]
impl<S> SubjectRepository<S> for InMemorySubjectRepository<S>
where
    S: Clone + Send + Sync,
{
    async fn find(&self, id: &str) -> Result<Option<S>, DomainError> {
        Ok(self.subjects.get(id).cloned())
    }
}
