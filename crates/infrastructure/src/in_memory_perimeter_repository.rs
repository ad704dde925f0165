use std::sync::Arc;

use async_trait::async_trait;
use perimetra_application::PerimeterRepository;
use perimetra_core::AppResult;
use perimetra_domain::PerimeterTree;
use tokio::sync::RwLock;

/// In-memory hierarchy repository serving an immutable snapshot.
///
/// Readers clone the current `Arc`, so a call keeps working on one
/// consistent snapshot even if [`InMemoryPerimeterRepository::replace`]
/// runs concurrently.
#[derive(Debug, Default)]
pub struct InMemoryPerimeterRepository {
    snapshot: RwLock<Arc<PerimeterTree>>,
}

impl InMemoryPerimeterRepository {
    /// Creates a repository serving the given hierarchy.
    #[must_use]
    pub fn new(tree: PerimeterTree) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(tree)),
        }
    }

    /// Swaps in a new hierarchy snapshot.
    pub async fn replace(&self, tree: PerimeterTree) {
        let perimeter_count = tree.len();
        *self.snapshot.write().await = Arc::new(tree);
        tracing::info!(perimeter_count, "perimeter snapshot replaced");
    }

    async fn current(&self) -> Arc<PerimeterTree> {
        Arc::clone(&*self.snapshot.read().await)
    }
}

#[async_trait]
impl PerimeterRepository for InMemoryPerimeterRepository {
    async fn snapshot(&self) -> AppResult<Arc<PerimeterTree>> {
        Ok(self.current().await)
    }
}

#[cfg(test)]
mod tests {
    use perimetra_application::PerimeterRepository;
    use perimetra_domain::{Perimeter, PerimeterId, PerimeterTree, PerimeterType, ResolutionError};

    use super::InMemoryPerimeterRepository;

    fn perimeter(id: i64, perimeter_type: PerimeterType, parent: Option<i64>) -> Perimeter {
        let perimeter = Perimeter::new(
            PerimeterId::new(id),
            format!("Perimeter {id}"),
            perimeter_type,
            parent.map(PerimeterId::new),
        );
        assert!(perimeter.is_ok());
        perimeter.unwrap_or_else(|_| unreachable!())
    }

    fn tree(perimeters: Vec<Perimeter>) -> PerimeterTree {
        let tree = PerimeterTree::new(perimeters);
        assert!(tree.is_ok());
        tree.unwrap_or_default()
    }

    #[tokio::test]
    async fn snapshot_serves_ancestor_chains_and_children() {
        let repository = InMemoryPerimeterRepository::new(tree(vec![
            perimeter(1, PerimeterType::Group, None),
            perimeter(2, PerimeterType::Hospital, Some(1)),
            perimeter(3, PerimeterType::Department, Some(2)),
        ]));
        let snapshot = repository.snapshot().await.unwrap_or_default();

        let chain = snapshot.with_ancestors(&[PerimeterId::new(3)]);
        assert!(chain.is_ok());
        assert_eq!(chain.unwrap_or_default().len(), 3);

        let children = snapshot.children_within(&[PerimeterId::new(1)], 1);
        assert!(children.is_ok());
        let ids: Vec<PerimeterId> = children
            .unwrap_or_default()
            .iter()
            .map(Perimeter::id)
            .collect();
        assert_eq!(ids, vec![PerimeterId::new(1), PerimeterId::new(2)]);
    }

    #[tokio::test]
    async fn empty_snapshot_knows_no_perimeter() {
        let repository = InMemoryPerimeterRepository::default();

        let snapshot = repository.snapshot().await.unwrap_or_default();
        let result = snapshot.with_ancestors(&[PerimeterId::new(7)]);
        assert!(matches!(result, Err(ResolutionError::UnknownPerimeter(_))));
    }

    #[tokio::test]
    async fn replace_does_not_affect_held_snapshots() {
        let repository =
            InMemoryPerimeterRepository::new(tree(vec![perimeter(1, PerimeterType::Group, None)]));
        let held = repository.snapshot().await.unwrap_or_default();

        repository
            .replace(tree(vec![
                perimeter(1, PerimeterType::Group, None),
                perimeter(2, PerimeterType::Hospital, Some(1)),
            ]))
            .await;

        assert_eq!(held.len(), 1);
        let current = repository.snapshot().await.unwrap_or_default();
        assert_eq!(current.len(), 2);
    }
}
