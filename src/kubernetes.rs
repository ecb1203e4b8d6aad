use crate::error::ClusterError;
use crate::types::{ResolvedResource, ResourceKind};
use async_trait::async_trait;
use futures::io::{AsyncBufRead, AsyncBufReadExt};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Event, Pod};
use kube::api::{ListParams, LogParams};
use kube::{Api, Client, config};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

/// Timeout for connecting to the API server
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Page size for event list requests
const PAGE_SIZE: u32 = 500;

/// Log lines buffered between the reader task and the collector
const LINE_BUFFER: usize = 1024;

/// Lines of a container log as they arrive from the cluster.
pub type LogLines = BoxStream<'static, std::io::Result<String>>;

/// Split a raw log body into lines on `\n`, dropping a trailing `\r`.
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the line.
/// The stream ends after the first I/O error.
pub fn byte_lines<R: AsyncBufRead + Unpin>(reader: R) -> impl Stream<Item = std::io::Result<String>> {
    stream::unfold(Some(reader), |reader| async move {
        let mut reader = reader?;
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => None,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                let line = String::from_utf8_lossy(&buf).into_owned();
                Some((Ok(line), Some(reader)))
            }
            Err(e) => Some((Err(e), None)),
        }
    })
}

/// Everything the report pipeline needs from the cluster.
#[async_trait]
pub trait ClusterAccess: Send + Sync {
    async fn get_resource(
        &self,
        namespace: &str,
        kind: ResourceKind,
        name: &str,
    ) -> Result<ResolvedResource, ClusterError>;

    async fn list_pods(&self, namespace: &str, label_selector: &str)
    -> Result<Vec<Pod>, ClusterError>;

    async fn stream_logs(
        &self,
        namespace: &str,
        pod_name: &str,
        container_name: &str,
        tail_lines: Option<i64>,
    ) -> Result<LogLines, ClusterError>;

    async fn list_events(&self, namespace: &str) -> Result<Vec<Event>, ClusterError>;
}

/// Cluster access backed by a kube client.
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    /// Build a client from the given kubeconfig context, or the current one.
    pub async fn connect(
        context: Option<&str>,
        request_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let mut config = match context {
            Some(ctx) => config::Config::from_kubeconfig(&config::KubeConfigOptions {
                context: Some(ctx.to_string()),
                ..Default::default()
            })
            .await
            .map_err(|e| anyhow::anyhow!("Context '{}' not found in kubeconfig: {}", ctx, e))?,
            None => config::Config::infer().await?,
        };

        config.connect_timeout = Some(CONNECT_TIMEOUT);
        config.read_timeout = Some(request_timeout);

        let client = Client::try_from(config)?;
        info!(
            "Initialized client for context: {}",
            context.unwrap_or("current")
        );
        Ok(Self { client })
    }
}

#[async_trait]
impl ClusterAccess for KubeCluster {
    async fn get_resource(
        &self,
        namespace: &str,
        kind: ResourceKind,
        name: &str,
    ) -> Result<ResolvedResource, ClusterError> {
        match kind {
            ResourceKind::Deployment => {
                let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
                Ok(ResolvedResource::Deployment(Box::new(api.get(name).await?)))
            }
            ResourceKind::Pod => {
                let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
                Ok(ResolvedResource::Pod(Box::new(api.get(name).await?)))
            }
        }
    }

    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Pod>, ClusterError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pods = api.list(&ListParams::default().labels(label_selector)).await?;
        Ok(pods.items)
    }

    async fn stream_logs(
        &self,
        namespace: &str,
        pod_name: &str,
        container_name: &str,
        tail_lines: Option<i64>,
    ) -> Result<LogLines, ClusterError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let lp = LogParams {
            container: Some(container_name.to_string()),
            tail_lines,
            ..Default::default()
        };
        let pod_name = pod_name.to_string();

        // The reader task owns the api handle; lines are forwarded over a channel
        let (open_tx, open_rx) = oneshot::channel();
        let (line_tx, line_rx) = mpsc::channel(LINE_BUFFER);
        tokio::spawn(async move {
            match api.log_stream(&pod_name, &lp).await {
                Ok(stream) => {
                    if open_tx.send(Ok(())).is_err() {
                        return;
                    }
                    let mut lines = Box::pin(byte_lines(Box::pin(stream)));
                    while let Some(line) = lines.next().await {
                        let failed = line.is_err();
                        if line_tx.send(line).await.is_err() || failed {
                            break;
                        }
                    }
                }
                Err(e) => {
                    let _ = open_tx.send(Err(e));
                }
            }
        });

        match open_rx.await {
            Ok(Ok(())) => Ok(ReceiverStream::new(line_rx).boxed()),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err("log stream task ended before the stream was opened".into()),
        }
    }

    async fn list_events(&self, namespace: &str) -> Result<Vec<Event>, ClusterError> {
        let api: Api<Event> = Api::namespaced(self.client.clone(), namespace);
        let mut all_items = Vec::new();
        let mut continue_token: Option<String> = None;
        let mut page_count = 0u32;

        loop {
            let mut params = ListParams::default().limit(PAGE_SIZE);
            if let Some(ref token) = continue_token {
                params = params.continue_token(token);
            }

            let list = api.list(&params).await?;
            all_items.extend(list.items);
            page_count += 1;

            match list.metadata.continue_ {
                Some(token) if !token.is_empty() => continue_token = Some(token),
                _ => break,
            }
        }

        debug!(
            namespace = %namespace,
            pages = page_count,
            total = all_items.len(),
            "Listed events"
        );
        Ok(all_items)
    }
}
