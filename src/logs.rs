use crate::error::{ClusterError, Error, LogStage};
use crate::kubernetes::ClusterAccess;
use crate::types::{ContainerLogResult, LogStatus, PodRef};
use futures::stream::{self, StreamExt};
use regex::Regex;
use tracing::{debug, warn};

/// Post-fetch log transform: keep the last `tail` lines, then keep lines matching `pattern`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub tail: usize,
    pub pattern: Option<String>,
}

impl LogFilter {
    pub fn is_noop(&self) -> bool {
        self.tail == 0 && self.pattern.is_none()
    }

    /// Tail count forwarded to the API server so it can skip older lines.
    pub fn server_tail_lines(&self) -> Option<i64> {
        i64::try_from(self.tail).ok().filter(|&n| n > 0)
    }
}

/// Split log text into lines, dropping the empty artifact after a trailing newline.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

/// Keep the last `n` lines. `n == 0` keeps everything.
fn tail_lines(lines: Vec<&str>, n: usize) -> Vec<&str> {
    if n == 0 || n >= lines.len() {
        return lines;
    }
    lines[lines.len() - n..].to_vec()
}

fn match_lines<'a>(lines: Vec<&'a str>, pattern: &str) -> Result<Vec<&'a str>, Error> {
    let regex = Regex::new(pattern).map_err(|source| Error::InvalidFilterPattern {
        pattern: pattern.to_string(),
        source,
    })?;
    Ok(lines.into_iter().filter(|line| regex.is_match(line)).collect())
}

/// Truncate to the last `tail` lines, then keep the ones matching `pattern`.
///
/// Filtering runs after truncation, so the result holds the matching lines among
/// the last `tail`, not the last `tail` matching lines.
pub fn filter_logs(text: &str, tail: usize, pattern: Option<&str>) -> Result<String, Error> {
    let lines = tail_lines(split_lines(text), tail);
    let lines = match pattern {
        Some(pattern) => match_lines(lines, pattern)?,
        None => lines,
    };
    Ok(lines.join("\n"))
}

/// Apply the filter, falling back to tail-only output when the pattern does not compile.
fn apply_filter(pod: &str, container: &str, text: String, filter: &LogFilter) -> String {
    if filter.is_noop() {
        return text;
    }
    match filter_logs(&text, filter.tail, filter.pattern.as_deref()) {
        Ok(filtered) => filtered,
        Err(e) => {
            warn!("[{}/{}] {}", pod, container, e);
            tail_lines(split_lines(&text), filter.tail).join("\n")
        }
    }
}

async fn fetch_container_log<C: ClusterAccess + ?Sized>(
    client: &C,
    namespace: &str,
    pod: &str,
    container: &str,
    filter: &LogFilter,
) -> ContainerLogResult {
    let result = |text: String, status: LogStatus| ContainerLogResult {
        pod_name: pod.to_string(),
        container_name: container.to_string(),
        text,
        status,
    };
    let failure = |stage: LogStage, source: ClusterError| {
        let err = Error::ContainerLogFetch {
            pod: pod.to_string(),
            container: container.to_string(),
            stage,
            source,
        };
        warn!("{}", err);
        result(String::new(), LogStatus::FetchError(err.to_string()))
    };

    let mut stream = match client
        .stream_logs(namespace, pod, container, filter.server_tail_lines())
        .await
    {
        Ok(stream) => stream,
        Err(source) => return failure(LogStage::Open, source),
    };

    let mut lines = Vec::new();
    while let Some(line) = stream.next().await {
        match line {
            Ok(line) => lines.push(line),
            Err(e) => return failure(LogStage::Read, e.into()),
        }
    }

    debug!("[{}/{}] Read {} log line(s)", pod, container, lines.len());
    result(apply_filter(pod, container, lines.join("\n"), filter), LogStatus::Fetched)
}

/// Options for log collection, fixed for the whole batch.
#[derive(Debug, Clone)]
pub struct LogOptions {
    pub enabled: bool,
    pub filter: LogFilter,
    pub concurrency: usize,
}

/// Collect logs for every container of every pod.
///
/// Returns one entry per pod, each holding one result per container, in
/// pod/container order regardless of which fetch completes first. A failing
/// container is recorded in its own result and never stops the others.
pub async fn collect_logs<C: ClusterAccess + ?Sized>(
    client: &C,
    namespace: &str,
    pods: &[PodRef],
    options: &LogOptions,
) -> Vec<Vec<ContainerLogResult>> {
    if !options.enabled {
        debug!("Log retrieval disabled, marking all containers skipped");
        return pods
            .iter()
            .map(|pod| {
                pod.containers
                    .iter()
                    .map(|c| ContainerLogResult::skipped(&pod.name, &c.name))
                    .collect()
            })
            .collect();
    }

    let fetches = pods.iter().flat_map(move |pod| {
        pod.containers.iter().map(move |c| {
            fetch_container_log(client, namespace, &pod.name, &c.name, &options.filter)
        })
    });
    let mut results = stream::iter(fetches)
        .buffered(options.concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter();

    pods.iter()
        .map(|pod| results.by_ref().take(pod.containers.len()).collect())
        .collect()
}
