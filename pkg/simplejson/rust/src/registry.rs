// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Named backend providers.
//!
//! Providers are registered on a [`RegistryBuilder`] during startup. Sealing
//! the builder produces a [`Registry`] that has no mutating methods and is
//! shared read-only by every request handler.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::errors::{Error, Result};
use crate::model::{Panel, ProviderResult};
use crate::target::SEPARATOR;
use crate::time_range::TimeRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    MetricReader,
    MetricFinder,
    AnnotationReader,
    PanelReader,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::MetricReader,
        ProviderKind::MetricFinder,
        ProviderKind::AnnotationReader,
        ProviderKind::PanelReader,
    ];
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::MetricReader => write!(f, "metric reader"),
            ProviderKind::MetricFinder => write!(f, "metric finder"),
            ProviderKind::AnnotationReader => write!(f, "annotation reader"),
            ProviderKind::PanelReader => write!(f, "panel reader"),
        }
    }
}

/// Returns time-series or table data for a query over a time range.
pub trait Reader: Send + Sync {
    fn read(&self, query: &str, range: &TimeRange) -> anyhow::Result<ProviderResult>;

    /// Whether `intervalMs` bucketing applies to this reader's series.
    fn resamples(&self) -> bool {
        true
    }
}

/// Returns candidate metric identifiers for a partial query.
pub trait Finder: Send + Sync {
    fn find(&self, query: &str) -> anyhow::Result<Vec<String>>;
}

pub trait AnnotationReader: Send + Sync {
    fn read_annotations(&self, query: &str, range: &TimeRange) -> anyhow::Result<ProviderResult>;
}

/// Returns an opaque payload (usually markup) rendered by a panel.
pub trait PanelReader: Send + Sync {
    fn read_panel(&self, query: &str, range: &TimeRange) -> anyhow::Result<Panel>;
}

impl<F> Reader for F
where
    F: Fn(&str, &TimeRange) -> anyhow::Result<ProviderResult> + Send + Sync,
{
    fn read(&self, query: &str, range: &TimeRange) -> anyhow::Result<ProviderResult> {
        self(query, range)
    }
}

impl<F> Finder for F
where
    F: Fn(&str) -> anyhow::Result<Vec<String>> + Send + Sync,
{
    fn find(&self, query: &str) -> anyhow::Result<Vec<String>> {
        self(query)
    }
}

impl<F> AnnotationReader for F
where
    F: Fn(&str, &TimeRange) -> anyhow::Result<ProviderResult> + Send + Sync,
{
    fn read_annotations(&self, query: &str, range: &TimeRange) -> anyhow::Result<ProviderResult> {
        self(query, range)
    }
}

impl<F> PanelReader for F
where
    F: Fn(&str, &TimeRange) -> anyhow::Result<Panel> + Send + Sync,
{
    fn read_panel(&self, query: &str, range: &TimeRange) -> anyhow::Result<Panel> {
        self(query, range)
    }
}

type Providers<T> = HashMap<String, Arc<T>>;

/// Startup-time collection of providers. Names are unique per kind.
#[derive(Default)]
pub struct RegistryBuilder {
    readers: Providers<dyn Reader>,
    finders: Providers<dyn Finder>,
    annotation_readers: Providers<dyn AnnotationReader>,
    panel_readers: Providers<dyn PanelReader>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_reader(&mut self, name: &str, reader: impl Reader + 'static) -> Result<&mut Self> {
        let reader: Arc<dyn Reader> = Arc::new(reader);
        insert_unique(&mut self.readers, ProviderKind::MetricReader, name, reader)?;
        Ok(self)
    }

    pub fn register_finder(&mut self, name: &str, finder: impl Finder + 'static) -> Result<&mut Self> {
        let finder: Arc<dyn Finder> = Arc::new(finder);
        insert_unique(&mut self.finders, ProviderKind::MetricFinder, name, finder)?;
        Ok(self)
    }

    pub fn register_annotation_reader(
        &mut self,
        name: &str,
        reader: impl AnnotationReader + 'static,
    ) -> Result<&mut Self> {
        let reader: Arc<dyn AnnotationReader> = Arc::new(reader);
        insert_unique(&mut self.annotation_readers, ProviderKind::AnnotationReader, name, reader)?;
        Ok(self)
    }

    pub fn register_panel_reader(
        &mut self,
        name: &str,
        reader: impl PanelReader + 'static,
    ) -> Result<&mut Self> {
        let reader: Arc<dyn PanelReader> = Arc::new(reader);
        insert_unique(&mut self.panel_readers, ProviderKind::PanelReader, name, reader)?;
        Ok(self)
    }

    /// Freezes the registry. No provider can be added afterwards.
    pub fn seal(self) -> Registry {
        Registry {
            readers: self.readers,
            finders: self.finders,
            annotation_readers: self.annotation_readers,
            panel_readers: self.panel_readers,
        }
    }
}

fn insert_unique<T: ?Sized>(
    providers: &mut Providers<T>,
    kind: ProviderKind,
    name: &str,
    provider: Arc<T>,
) -> Result<()> {
    if name.is_empty() || name.contains(SEPARATOR) {
        return Err(Error::InvalidProviderName {
            kind,
            name: name.to_string(),
        });
    }
    if providers.contains_key(name) {
        return Err(Error::DuplicateProvider {
            kind,
            name: name.to_string(),
        });
    }
    debug!("registered {kind} {name}");
    providers.insert(name.to_string(), provider);
    Ok(())
}

fn resolve<T: ?Sized>(providers: &Providers<T>, kind: ProviderKind, name: &str) -> Result<Arc<T>> {
    providers
        .get(name)
        .cloned()
        .ok_or_else(|| Error::UnknownProvider {
            kind,
            name: name.to_string(),
        })
}

/// Sealed, read-only provider lookup.
pub struct Registry {
    readers: Providers<dyn Reader>,
    finders: Providers<dyn Finder>,
    annotation_readers: Providers<dyn AnnotationReader>,
    panel_readers: Providers<dyn PanelReader>,
}

impl Registry {
    pub fn reader(&self, name: &str) -> Result<Arc<dyn Reader>> {
        resolve(&self.readers, ProviderKind::MetricReader, name)
    }

    pub fn finder(&self, name: &str) -> Result<Arc<dyn Finder>> {
        resolve(&self.finders, ProviderKind::MetricFinder, name)
    }

    pub fn annotation_reader(&self, name: &str) -> Result<Arc<dyn AnnotationReader>> {
        resolve(&self.annotation_readers, ProviderKind::AnnotationReader, name)
    }

    pub fn panel_reader(&self, name: &str) -> Result<Arc<dyn PanelReader>> {
        resolve(&self.panel_readers, ProviderKind::PanelReader, name)
    }

    pub fn names(&self, kind: ProviderKind) -> Vec<String> {
        let mut names: Vec<String> = match kind {
            ProviderKind::MetricReader => self.readers.keys().cloned().collect(),
            ProviderKind::MetricFinder => self.finders.keys().cloned().collect(),
            ProviderKind::AnnotationReader => self.annotation_readers.keys().cloned().collect(),
            ProviderKind::PanelReader => self.panel_readers.keys().cloned().collect(),
        };
        names.sort();
        names
    }

    /// Finder and reader names, deduplicated and sorted.
    pub fn metric_provider_names(&self) -> Vec<String> {
        self.finders
            .keys()
            .chain(self.readers.keys())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
