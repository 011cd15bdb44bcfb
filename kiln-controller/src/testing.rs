//! In-memory control plane for tests
//!
//! `FakeCluster` implements every repository trait over shared maps and
//! counts the writes it receives. Failure switches turn lookups into
//! technical errors.

use async_trait::async_trait;
use kiln_client::{ClientError, Result};
use kiln_core::domain::build::Build;
use kiln_core::domain::build_run::{BuildRun, LABEL_BUILD};
use kiln_core::domain::strategy::BuildStrategy;
use kiln_core::domain::task_run::TaskRun;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

use crate::repository::{
    BuildRepository, BuildRunRepository, Repositories, RepositoryProbe, SecretRepository,
    StrategyRepository, TaskRunRepository,
};

type Key = (String, String);

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

#[derive(Default)]
struct Objects {
    builds: BTreeMap<Key, Build>,
    build_runs: BTreeMap<Key, BuildRun>,
    build_strategies: BTreeMap<Key, BuildStrategy>,
    cluster_build_strategies: BTreeMap<String, BuildStrategy>,
    secrets: BTreeSet<Key>,
    task_runs: BTreeMap<Key, TaskRun>,
    reachable: BTreeSet<String>,
}

#[derive(Default)]
struct ClusterState {
    objects: Mutex<Objects>,
    unavailable: AtomicBool,
    secret_failures: AtomicBool,
    task_run_failures: AtomicBool,
    build_status_updates: AtomicUsize,
    build_run_updates: AtomicUsize,
    build_run_status_updates: AtomicUsize,
    task_run_creations: AtomicUsize,
    probes: AtomicUsize,
}

impl ClusterState {
    fn available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ClientError::api_error(503, "control plane unavailable"));
        }
        Ok(())
    }

    fn check(&self, switch: &AtomicBool) -> Result<()> {
        self.available()?;
        if switch.load(Ordering::SeqCst) {
            return Err(ClientError::api_error(500, "injected failure"));
        }
        Ok(())
    }

    fn objects(&self) -> std::sync::MutexGuard<'_, Objects> {
        self.objects.lock().unwrap()
    }
}

/// Shared handle on an in-memory control plane
#[derive(Clone, Default)]
pub struct FakeCluster {
    state: Arc<ClusterState>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            builds: self.state.clone(),
            build_runs: self.state.clone(),
            strategies: self.state.clone(),
            secrets: self.state.clone(),
            task_runs: self.state.clone(),
            probe: self.state.clone(),
        }
    }

    pub fn secrets(&self) -> Arc<dyn SecretRepository> {
        self.state.clone()
    }

    pub fn strategies(&self) -> Arc<dyn StrategyRepository> {
        self.state.clone()
    }

    pub fn build_runs(&self) -> Arc<dyn BuildRunRepository> {
        self.state.clone()
    }

    pub fn probe(&self) -> Arc<dyn RepositoryProbe> {
        self.state.clone()
    }

    // ===== Seeding =====

    pub fn add_build(&self, build: Build) {
        let k = key(build.metadata.namespace(), &build.metadata.name);
        self.state.objects().builds.insert(k, build);
    }

    pub fn add_build_run(&self, build_run: BuildRun) {
        let k = key(build_run.metadata.namespace(), &build_run.metadata.name);
        self.state.objects().build_runs.insert(k, build_run);
    }

    pub fn add_build_strategy(&self, strategy: BuildStrategy) {
        let k = key(strategy.metadata.namespace(), &strategy.metadata.name);
        self.state.objects().build_strategies.insert(k, strategy);
    }

    pub fn add_cluster_build_strategy(&self, strategy: BuildStrategy) {
        let name = strategy.metadata.name.clone();
        self.state
            .objects()
            .cluster_build_strategies
            .insert(name, strategy);
    }

    pub fn add_secret(&self, namespace: &str, name: &str) {
        self.state.objects().secrets.insert(key(namespace, name));
    }

    pub fn add_task_run(&self, task_run: TaskRun) {
        let k = key(task_run.metadata.namespace(), &task_run.metadata.name);
        self.state.objects().task_runs.insert(k, task_run);
    }

    pub fn add_reachable_repository(&self, url: &str) {
        self.state.objects().reachable.insert(url.to_string());
    }

    // ===== Failure switches =====

    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn fail_secret_lookups(&self, fail: bool) {
        self.state.secret_failures.store(fail, Ordering::SeqCst);
    }

    pub fn fail_task_run_lookups(&self, fail: bool) {
        self.state.task_run_failures.store(fail, Ordering::SeqCst);
    }

    // ===== Inspection =====

    pub fn build(&self, namespace: &str, name: &str) -> Option<Build> {
        self.state.objects().builds.get(&key(namespace, name)).cloned()
    }

    pub fn build_run(&self, namespace: &str, name: &str) -> Option<BuildRun> {
        self.state
            .objects()
            .build_runs
            .get(&key(namespace, name))
            .cloned()
    }

    pub fn task_run(&self, namespace: &str, name: &str) -> Option<TaskRun> {
        self.state
            .objects()
            .task_runs
            .get(&key(namespace, name))
            .cloned()
    }

    pub fn build_status_updates(&self) -> usize {
        self.state.build_status_updates.load(Ordering::SeqCst)
    }

    pub fn build_run_updates(&self) -> usize {
        self.state.build_run_updates.load(Ordering::SeqCst)
    }

    pub fn build_run_status_updates(&self) -> usize {
        self.state.build_run_status_updates.load(Ordering::SeqCst)
    }

    pub fn task_run_creations(&self) -> usize {
        self.state.task_run_creations.load(Ordering::SeqCst)
    }

    pub fn probe_count(&self) -> usize {
        self.state.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BuildRepository for ClusterState {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Build>> {
        self.available()?;
        Ok(self.objects().builds.get(&key(namespace, name)).cloned())
    }

    async fn list(&self, namespace: &str) -> Result<Vec<Build>> {
        self.available()?;
        Ok(self
            .objects()
            .builds
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, build)| build.clone())
            .collect())
    }

    async fn update_status(&self, build: &Build) -> Result<()> {
        self.available()?;
        let k = key(build.metadata.namespace(), &build.metadata.name);
        let mut objects = self.objects();
        let stored = objects
            .builds
            .get_mut(&k)
            .ok_or_else(|| ClientError::NotFound(build.metadata.name.clone()))?;
        stored.status = build.status.clone();
        self.build_status_updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl BuildRunRepository for ClusterState {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<BuildRun>> {
        self.available()?;
        Ok(self.objects().build_runs.get(&key(namespace, name)).cloned())
    }

    async fn list(&self, namespace: &str) -> Result<Vec<BuildRun>> {
        self.available()?;
        Ok(self
            .objects()
            .build_runs
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, run)| run.clone())
            .collect())
    }

    async fn list_for_build(&self, namespace: &str, build_name: &str) -> Result<Vec<BuildRun>> {
        let runs = BuildRunRepository::list(self, namespace).await?;
        Ok(runs
            .into_iter()
            .filter(|run| {
                run.metadata.labels.get(LABEL_BUILD).map(String::as_str) == Some(build_name)
            })
            .collect())
    }

    async fn update(&self, build_run: &BuildRun) -> Result<()> {
        self.available()?;
        let k = key(build_run.metadata.namespace(), &build_run.metadata.name);
        let mut objects = self.objects();
        let stored = objects
            .build_runs
            .get_mut(&k)
            .ok_or_else(|| ClientError::NotFound(build_run.metadata.name.clone()))?;
        stored.metadata = build_run.metadata.clone();
        stored.spec = build_run.spec.clone();
        self.build_run_updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_status(&self, build_run: &BuildRun) -> Result<()> {
        self.available()?;
        let k = key(build_run.metadata.namespace(), &build_run.metadata.name);
        let mut objects = self.objects();
        let stored = objects
            .build_runs
            .get_mut(&k)
            .ok_or_else(|| ClientError::NotFound(build_run.metadata.name.clone()))?;
        stored.status = build_run.status.clone();
        self.build_run_status_updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl StrategyRepository for ClusterState {
    async fn get_build_strategy(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BuildStrategy>> {
        self.available()?;
        Ok(self
            .objects()
            .build_strategies
            .get(&key(namespace, name))
            .cloned())
    }

    async fn get_cluster_build_strategy(&self, name: &str) -> Result<Option<BuildStrategy>> {
        self.available()?;
        Ok(self.objects().cluster_build_strategies.get(name).cloned())
    }
}

#[async_trait]
impl SecretRepository for ClusterState {
    async fn exists(&self, namespace: &str, name: &str) -> Result<bool> {
        self.check(&self.secret_failures)?;
        Ok(self.objects().secrets.contains(&key(namespace, name)))
    }
}

#[async_trait]
impl TaskRunRepository for ClusterState {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<TaskRun>> {
        self.check(&self.task_run_failures)?;
        Ok(self.objects().task_runs.get(&key(namespace, name)).cloned())
    }

    async fn create(&self, task_run: &TaskRun) -> Result<TaskRun> {
        self.check(&self.task_run_failures)?;
        let k = key(task_run.metadata.namespace(), &task_run.metadata.name);
        let mut objects = self.objects();
        if objects.task_runs.contains_key(&k) {
            return Err(ClientError::Conflict(task_run.metadata.name.clone()));
        }
        objects.task_runs.insert(k, task_run.clone());
        self.task_run_creations.fetch_add(1, Ordering::SeqCst);
        Ok(task_run.clone())
    }
}

#[async_trait]
impl RepositoryProbe for ClusterState {
    async fn is_reachable(&self, url: &Url) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let url = url.as_str().trim_end_matches('/');
        self.objects().reachable.contains(url)
    }
}

/// Sample catalog of resources
pub mod sample {
    use kiln_core::domain::build::{Build, BuildSpec, GitSource, Image, StrategyRef};
    use kiln_core::domain::build_run::{BuildRun, BuildRunSpec, LABEL_BUILD, ReferencedBuild};
    use kiln_core::domain::condition::ConditionStatus;
    use kiln_core::domain::meta::ObjectMeta;
    use kiln_core::domain::pipeline::Step;
    use kiln_core::domain::reason::{ALL_VALIDATIONS_SUCCEEDED, BuildReason};
    use kiln_core::domain::strategy::{BuildStrategy, BuildStrategySpec, Parameter};
    use kiln_core::domain::task_run::TaskRun;

    pub const NAMESPACE: &str = "build-examples";

    /// A Build of the sample Go application using the `buildah` strategy
    pub fn build(name: &str) -> Build {
        let mut metadata = ObjectMeta::namespaced(NAMESPACE, name);
        metadata.uid = format!("{}-uid", name);
        Build {
            metadata,
            spec: BuildSpec {
                source: Some(GitSource {
                    url: "https://github.com/kiln-build/sample-go".to_string(),
                    context_dir: Some("docker-build".to_string()),
                    ..Default::default()
                }),
                strategy: StrategyRef {
                    name: "buildah".to_string(),
                    kind: None,
                },
                output: Image {
                    image: "image-registry.local/build-examples/sample-go".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
            status: Default::default(),
        }
    }

    /// Marks a Build as successfully validated
    pub fn registered(mut build: Build) -> Build {
        build.status.registered = Some(ConditionStatus::True);
        build.status.reason = Some(BuildReason::Succeeded);
        build.status.message = Some(ALL_VALIDATIONS_SUCCEEDED.to_string());
        build
    }

    pub fn build_strategy(namespace: &str, name: &str) -> BuildStrategy {
        BuildStrategy {
            metadata: ObjectMeta::namespaced(namespace, name),
            spec: BuildStrategySpec {
                steps: vec![Step {
                    name: "build-and-push".to_string(),
                    image: "quay.io/containers/buildah:v1.37.0".to_string(),
                    command: vec!["/bin/bash".to_string()],
                    args: vec![
                        "-c".to_string(),
                        "buildah bud -f $(params.dockerfile) -t $(params.kiln-output-image) $(params.kiln-source-context)".to_string(),
                    ],
                    working_dir: Some("$(params.kiln-source-root)".to_string()),
                    ..Default::default()
                }],
                parameters: vec![Parameter {
                    name: "dockerfile".to_string(),
                    description: "The path to the Dockerfile".to_string(),
                    default: Some("Dockerfile".to_string()),
                }],
            },
        }
    }

    /// A BuildRun referencing the named Build
    pub fn build_run(name: &str, build_name: &str) -> BuildRun {
        let mut metadata = ObjectMeta::namespaced(NAMESPACE, name);
        metadata.uid = "f3c1d2e4-5b6a-4c7d-8e9f-0a1b2c3d4e5f".to_string();
        metadata
            .labels
            .insert(LABEL_BUILD.to_string(), build_name.to_string());
        BuildRun {
            metadata,
            spec: BuildRunSpec {
                build: ReferencedBuild {
                    name: Some(build_name.to_string()),
                    spec: None,
                },
                ..Default::default()
            },
            status: Default::default(),
        }
    }

    pub fn task_run(namespace: &str, name: &str) -> TaskRun {
        TaskRun {
            metadata: ObjectMeta::namespaced(namespace, name),
            ..Default::default()
        }
    }
}
