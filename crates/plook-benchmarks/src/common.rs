//! Common utilities for benchmarks

use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(2))
        .measurement_time(std::time::Duration::from_secs(5))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// Repository URLs in the shapes registries publish them
pub fn repository_urls() -> Vec<&'static str> {
    vec![
        "git://github.com/jquery/jquery.git",
        "git+https://github.com/lodash/lodash.git",
        "https://github.com/twbs/bootstrap",
        "git@github.com:angular/angular.js.git",
        "ssh://git@github.com/facebook/react.git",
        "https://gitlab.com/inkscape/inkscape.git",
        "https://bitbucket.org/owner/repo",
    ]
}

/// `count` version strings, newest last
pub fn version_list(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("{}.{}.{}", i / 100, (i / 10) % 10, i % 10))
        .collect()
}
