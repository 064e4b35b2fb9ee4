//! Source registry
//!
//! Builds the five fallback chains from configuration. A table listed in
//! more than one chain is backed by a single adapter, so a row inserted
//! through one entity is seen by every chain that reads that table.

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::PgPool;

use shared::{
    Canonical, Entity, FatteningRecord, ProductionRecord, QualityRecord, SalesRecord,
    StaffingRecord, PRODUCTION_REPORTS,
};

use super::adapter::{RecordSink, SourceAdapter, SourceError, TableSpec};
use super::memory::MemorySource;
use super::resolver::{Candidate, FallbackResolver};
use super::table::TableSource;
use crate::config::SourceChains;

/// Table that production reports are written to
pub const REPORT_TABLE: &str = "production_reports";

/// Resolvers for every entity plus the production insert target
#[derive(Clone)]
pub struct SourceRegistry {
    pub production: FallbackResolver<ProductionRecord>,
    pub quality: FallbackResolver<QualityRecord>,
    pub sales: FallbackResolver<SalesRecord>,
    pub fattening: FallbackResolver<FatteningRecord>,
    pub staffing: FallbackResolver<StaffingRecord>,
    report_sink: Arc<dyn RecordSink>,
}

/// Handles to the in-memory tables behind a registry
#[derive(Clone, Default)]
pub struct MemoryTables {
    tables: HashMap<&'static str, Arc<MemorySource>>,
}

impl MemoryTables {
    pub fn get(&self, table: &str) -> Option<Arc<MemorySource>> {
        self.tables.get(table).cloned()
    }
}

/// Every distinct table the chains reference, with merged column lists
fn collect_specs(chains: &SourceChains) -> Result<HashMap<&'static str, TableSpec>, SourceError> {
    fn add<T: Canonical>(
        specs: &mut HashMap<&'static str, TableSpec>,
        names: &[String],
    ) -> Result<(), SourceError> {
        for name in names {
            let table = T::table(name).ok_or_else(|| SourceError::UnknownTable(name.clone()))?;
            specs
                .entry(table.source)
                .and_modify(|spec| spec.merge(table))
                .or_insert_with(|| TableSpec::of(table));
        }
        Ok(())
    }

    let mut specs = HashMap::new();
    add::<ProductionRecord>(&mut specs, &chains.production)?;
    add::<QualityRecord>(&mut specs, &chains.quality)?;
    add::<SalesRecord>(&mut specs, &chains.sales)?;
    add::<FatteningRecord>(&mut specs, &chains.fattening)?;
    add::<StaffingRecord>(&mut specs, &chains.staffing)?;

    specs
        .entry(REPORT_TABLE)
        .and_modify(|spec| spec.merge(&PRODUCTION_REPORTS))
        .or_insert_with(|| TableSpec::of(&PRODUCTION_REPORTS));
    Ok(specs)
}

fn resolver<T: Canonical>(
    names: &[String],
    adapters: &HashMap<&'static str, Arc<dyn SourceAdapter>>,
) -> Result<FallbackResolver<T>, SourceError> {
    let candidates = names
        .iter()
        .map(|name| {
            let table = T::table(name).ok_or_else(|| SourceError::UnknownTable(name.clone()))?;
            let adapter = adapters
                .get(table.source)
                .cloned()
                .ok_or_else(|| SourceError::UnknownTable(name.clone()))?;
            Ok(Candidate { table, adapter })
        })
        .collect::<Result<Vec<_>, SourceError>>()?;

    tracing::debug!(entity = %T::ENTITY, chain = ?names, "Built source chain");
    Ok(FallbackResolver::new(candidates))
}

impl SourceRegistry {
    fn assemble(
        chains: &SourceChains,
        adapters: &HashMap<&'static str, Arc<dyn SourceAdapter>>,
        report_sink: Arc<dyn RecordSink>,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            production: resolver(&chains.production, adapters)?,
            quality: resolver(&chains.quality, adapters)?,
            sales: resolver(&chains.sales, adapters)?,
            fattening: resolver(&chains.fattening, adapters)?,
            staffing: resolver(&chains.staffing, adapters)?,
            report_sink,
        })
    }

    /// Chains over PostgreSQL tables
    pub fn postgres(db: PgPool, chains: &SourceChains) -> Result<Self, SourceError> {
        let mut adapters: HashMap<&'static str, Arc<dyn SourceAdapter>> = HashMap::new();
        let mut report_sink: Option<Arc<dyn RecordSink>> = None;

        for (name, spec) in collect_specs(chains)? {
            let source = Arc::new(TableSource::new(db.clone(), spec));
            if name == REPORT_TABLE {
                let sink: Arc<dyn RecordSink> = source.clone();
                report_sink = Some(sink);
            }
            adapters.insert(name, source);
        }

        let report_sink =
            report_sink.ok_or_else(|| SourceError::UnknownTable(REPORT_TABLE.to_string()))?;
        Self::assemble(chains, &adapters, report_sink)
    }

    /// Chains over empty in-memory tables
    pub fn in_memory(chains: &SourceChains) -> Result<(Self, MemoryTables), SourceError> {
        let mut adapters: HashMap<&'static str, Arc<dyn SourceAdapter>> = HashMap::new();
        let mut tables = MemoryTables::default();

        for (name, spec) in collect_specs(chains)? {
            let source = Arc::new(MemorySource::new(spec));
            adapters.insert(name, source.clone());
            tables.tables.insert(name, source);
        }

        let report_source = tables
            .get(REPORT_TABLE)
            .ok_or_else(|| SourceError::UnknownTable(REPORT_TABLE.to_string()))?;
        let report_sink: Arc<dyn RecordSink> = report_source;
        let registry = Self::assemble(chains, &adapters, report_sink)?;
        Ok((registry, tables))
    }

    pub fn report_sink(&self) -> Arc<dyn RecordSink> {
        Arc::clone(&self.report_sink)
    }

    pub fn source_chain(&self, entity: Entity) -> Vec<&str> {
        match entity {
            Entity::Production => self.production.source_chain(),
            Entity::Quality => self.quality.source_chain(),
            Entity::Sales => self.sales.source_chain(),
            Entity::Fattening => self.fattening.source_chain(),
            Entity::Staffing => self.staffing.source_chain(),
        }
    }
}
