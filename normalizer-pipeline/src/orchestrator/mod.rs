//! This module defines the `Orchestrator` responsible for sequencing the
//! migration.
//!
//! The migration is a fixed series of phases: the schema phase, one phase per
//! catalog category, and the prune phase. Every phase runs in its own session
//! and commits on success. A failing phase is rolled back and ends the run;
//! phases committed before it stay committed, and running again from the start
//! picks up where the failed run stopped.
use std::sync::Arc;

use normalizer_repository::{MigrationRepository, MigrationSession, OwnerPayload, RepositoryError};
use normalizer_shared::types::{CategorySpec, Destination, MigrationCatalog};
use tracing::{error, info, instrument, warn};

use crate::errors::OrchestratorError;
use crate::extractor::{extract, Extracted, ExtractedEntry};
use crate::linker::JunctionLinker;
use crate::pruner::ColumnPruner;
use crate::resolver::DimensionResolver;
use crate::schema::SchemaBuilder;

pub const SCHEMA_PHASE: &str = "schema";
pub const PRUNE_PHASE: &str = "prune";

/// Where a migration run currently stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MigrationState {
    Unstarted,
    SchemaReady,
    /// The named category is the last one committed.
    Migrated { category: &'static str },
    Pruned,
    Complete,
    /// The named phase was rolled back; earlier phases remain committed.
    Failed { phase: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseStatus {
    Committed,
    /// The source column was already gone, so there was nothing to do.
    AlreadyMigrated,
    Failed,
}

impl PhaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseStatus::Committed => "committed",
            PhaseStatus::AlreadyMigrated => "already_migrated",
            PhaseStatus::Failed => "failed",
        }
    }
}

/// Counters for one phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseReport {
    pub phase: String,
    pub status: PhaseStatus,
    /// Entries that produced a field-set.
    pub extracted: usize,
    /// Entries dropped for a blank identity or an unmatched size pair.
    pub discarded: usize,
    /// Payloads or entries that could not be coerced.
    pub skipped: usize,
    pub dimensions_created: usize,
    pub links_created: usize,
    pub children_created: usize,
    pub tables_created: usize,
    pub columns_dropped: Vec<&'static str>,
}

impl PhaseReport {
    fn new(phase: &str) -> Self {
        Self {
            phase: phase.to_string(),
            status: PhaseStatus::Committed,
            extracted: 0,
            discarded: 0,
            skipped: 0,
            dimensions_created: 0,
            links_created: 0,
            children_created: 0,
            tables_created: 0,
            columns_dropped: Vec::new(),
        }
    }
}

/// The phase reports of one run, in execution order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub phases: Vec<PhaseReport>,
}

impl MigrationReport {
    pub fn phase(&self, name: &str) -> Option<&PhaseReport> {
        self.phases.iter().find(|report| report.phase == name)
    }

    pub fn total_skipped(&self) -> usize {
        self.phases.iter().map(|report| report.skipped).sum()
    }
}

enum Phase {
    Schema,
    Category(CategorySpec),
    Prune,
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Schema => SCHEMA_PHASE,
            Phase::Category(category) => category.name,
            Phase::Prune => PRUNE_PHASE,
        }
    }

    fn completed_state(&self) -> MigrationState {
        match self {
            Phase::Schema => MigrationState::SchemaReady,
            Phase::Category(category) => MigrationState::Migrated {
                category: category.name,
            },
            Phase::Prune => MigrationState::Pruned,
        }
    }
}

/// `Orchestrator` drives a catalog through the migration phases against a
/// repository.
pub struct Orchestrator {
    repository: Arc<dyn MigrationRepository>,
    catalog: MigrationCatalog,
    state: MigrationState,
    report: MigrationReport,
}

impl Orchestrator {
    /// Creates a new `Orchestrator` instance.
    ///
    /// # Arguments
    ///
    /// * `repository` - The store the migration runs against
    /// * `catalog` - Owner table and categories to migrate
    pub fn new(repository: Arc<dyn MigrationRepository>, catalog: MigrationCatalog) -> Self {
        Self {
            repository,
            catalog,
            state: MigrationState::Unstarted,
            report: MigrationReport::default(),
        }
    }

    pub fn state(&self) -> &MigrationState {
        &self.state
    }

    /// Reports of the latest run, including the failed phase if it failed.
    pub fn report(&self) -> &MigrationReport {
        &self.report
    }

    /// Runs every phase in order.
    ///
    /// # Returns
    ///
    /// * `Ok(MigrationReport)` - All phases committed and the state is `Complete`
    /// * `Err(OrchestratorError)` - A phase was rolled back; the state is
    ///   `Failed` and [`report`](Self::report) holds what was done so far
    #[instrument(skip(self), fields(owner = %self.catalog.owner.name))]
    pub async fn run(&mut self) -> Result<MigrationReport, OrchestratorError> {
        self.state = MigrationState::Unstarted;
        self.report = MigrationReport::default();
        info!(categories = self.catalog.categories.len(), "Starting migration");

        self.run_phase(Phase::Schema).await?;

        let categories = self.catalog.categories.clone();
        for category in categories {
            self.run_phase(Phase::Category(category)).await?;
        }

        self.run_phase(Phase::Prune).await?;
        self.state = MigrationState::Complete;

        info!(
            phases = self.report.phases.len(),
            skipped = self.report.total_skipped(),
            "Migration complete"
        );
        Ok(self.report.clone())
    }

    async fn run_phase(&mut self, phase: Phase) -> Result<(), OrchestratorError> {
        let name = phase.name();
        let mut report = PhaseReport::new(name);

        match self.execute_phase(&phase, &mut report).await {
            Ok(()) => {
                info!(
                    phase = name,
                    outcome = report.status.as_str(),
                    extracted = report.extracted,
                    discarded = report.discarded,
                    skipped = report.skipped,
                    dimensions_created = report.dimensions_created,
                    links_created = report.links_created,
                    children_created = report.children_created,
                    tables_created = report.tables_created,
                    columns_dropped = report.columns_dropped.len(),
                    "Phase finished"
                );
                self.state = phase.completed_state();
                self.report.phases.push(report);
                Ok(())
            }
            Err(e) => {
                report.status = PhaseStatus::Failed;
                error!(
                    phase = name,
                    outcome = report.status.as_str(),
                    error = %e,
                    extracted = report.extracted,
                    skipped = report.skipped,
                    "Phase rolled back"
                );
                self.state = MigrationState::Failed {
                    phase: name.to_string(),
                };
                self.report.phases.push(report);
                Err(e)
            }
        }
    }

    /// Runs one phase inside its own session, committing on success and
    /// rolling back on failure.
    async fn execute_phase(&self, phase: &Phase, report: &mut PhaseReport) -> Result<(), OrchestratorError> {
        let name = phase.name();
        let store_error = |source: RepositoryError| OrchestratorError::Phase {
            phase: name.to_string(),
            source,
        };

        let mut session = self.repository.begin().await.map_err(store_error)?;

        let result = match phase {
            Phase::Schema => self.build_schema(session.as_mut(), report).await,
            Phase::Category(category) => self
                .migrate_category(session.as_mut(), category, report)
                .await
                .map_err(store_error),
            Phase::Prune => self.prune(session.as_mut(), report).await.map_err(store_error),
        };

        match result {
            Ok(()) => session.commit().await.map_err(store_error),
            Err(e) => {
                if let Err(rollback) = session.rollback().await {
                    warn!(phase = name, error = %rollback, "Rollback failed, discarding session");
                }
                Err(e)
            }
        }
    }

    async fn build_schema(
        &self,
        session: &mut dyn MigrationSession,
        report: &mut PhaseReport,
    ) -> Result<(), OrchestratorError> {
        let outcome = SchemaBuilder::new(&self.catalog).build(session).await?;
        report.tables_created = outcome.tables_created.len();
        Ok(())
    }

    async fn migrate_category(
        &self,
        session: &mut dyn MigrationSession,
        category: &CategorySpec,
        report: &mut PhaseReport,
    ) -> Result<(), RepositoryError> {
        let owner = &self.catalog.owner;

        // A pruned source column means an earlier run finished this category.
        if !session.column_exists(&owner.name, category.source_column).await? {
            report.status = PhaseStatus::AlreadyMigrated;
            return Ok(());
        }

        let payloads = session.fetch_payloads(owner, category.source_column).await?;

        for OwnerPayload { owner_id, payload } in payloads {
            let entries = match extract(payload.as_ref(), category) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(phase = category.name, owner_id, error = %e, "Skipping unreadable payload");
                    report.skipped += 1;
                    continue;
                }
            };

            for outcome in entries {
                match outcome {
                    Ok(Extracted::Entry(entry)) => {
                        report.extracted += 1;
                        self.load_entry(session, category, owner_id, &entry, report).await?;
                    }
                    Ok(Extracted::Discarded { .. }) => report.discarded += 1,
                    Err(e) => {
                        warn!(phase = category.name, owner_id, error = %e, "Skipping malformed entry");
                        report.skipped += 1;
                    }
                }
            }
        }

        Ok(())
    }

    async fn load_entry(
        &self,
        session: &mut dyn MigrationSession,
        category: &CategorySpec,
        owner_id: i64,
        entry: &ExtractedEntry,
        report: &mut PhaseReport,
    ) -> Result<(), RepositoryError> {
        let owner = &self.catalog.owner;

        match category.destination {
            Destination::Dimension { dimension, junction } => {
                let resolution = DimensionResolver::new(dimension)
                    .resolve(session, &entry.fields)
                    .await?;
                if resolution.created {
                    report.dimensions_created += 1;
                }
                if JunctionLinker::new(owner, junction)
                    .link(session, owner_id, resolution.id)
                    .await?
                {
                    report.links_created += 1;
                }
            }
            Destination::Child(child) => {
                if session
                    .insert_child(owner, &child, owner_id, entry.ordinal, &entry.fields)
                    .await?
                {
                    report.children_created += 1;
                }
            }
        }

        Ok(())
    }

    async fn prune(&self, session: &mut dyn MigrationSession, report: &mut PhaseReport) -> Result<(), RepositoryError> {
        let columns = self.catalog.pruned_columns();
        report.columns_dropped = ColumnPruner::new(&self.catalog.owner)
            .prune(session, &columns)
            .await?;
        Ok(())
    }
}
