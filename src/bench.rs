//! Minimal timing harness used by the `benches/` targets.

use std::fs;
use std::io::{stdout, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct Benchmark {
    f: Rc<dyn Fn()>,
    name: String,
    iterations: usize,
    pixels: usize,
}

pub enum Unit {
    Nanosecond,
    Microsecond,
    Millisecond,
    Second,
}

impl Unit {
    pub fn format(&self, d: &Duration, width: usize) -> String {
        let (symbol, value) = match self {
            Self::Nanosecond => ("ns", d.as_nanos()),
            Self::Microsecond => ("µs", d.as_micros()),
            Self::Millisecond => ("ms", d.as_millis()),
            Self::Second => ("s", d.as_secs() as u128),
        };
        format!("{:>width$}{:<2}", value, symbol)
    }

    pub fn scaled(d: &Duration, treshold: u128) -> Self {
        if d.as_nanos() < treshold {
            Self::Nanosecond
        } else if d.as_micros() < treshold {
            Self::Microsecond
        } else if d.as_millis() < treshold {
            Self::Millisecond
        } else {
            Self::Second
        }
    }
}

impl Benchmark {
    pub fn iter<F: Fn() + 'static>(name: &str, n: usize, f: F) -> Self {
        Self {
            f: Rc::new(f),
            name: name.to_string(),
            iterations: n,
            pixels: 0,
        }
    }

    /// Pixels produced per call, used to report throughput.
    pub fn pixels(mut self, pixels: usize) -> Self {
        self.pixels = pixels;
        self
    }

    fn run(&self) -> Duration {
        let start = Instant::now();
        for _ in 0..self.iterations {
            (self.f)();
        }
        Instant::now() - start
    }
}

struct BenchResult {
    name: String,
    iterations: usize,
    pixels: usize,
    total: Duration,
}

impl BenchResult {
    fn per_call(&self) -> Duration {
        self.total.div_f64(self.iterations.max(1) as f64)
    }

    fn mpx_per_sec(&self) -> f64 {
        let secs = self.per_call().as_secs_f64();
        if self.pixels == 0 || secs == 0.0 {
            0.0
        } else {
            self.pixels as f64 / secs / 1e6
        }
    }
}

pub struct BenchmarkReport {
    benches: Vec<Benchmark>,
    results: Vec<BenchResult>,
}

impl BenchmarkReport {
    pub fn new() -> Self {
        Self {
            benches: vec![],
            results: vec![],
        }
    }

    pub fn add_bench(&mut self, bench: Benchmark) {
        self.benches.push(bench);
    }

    pub fn with_benches(benches: &[Benchmark]) -> Self {
        let mut this = Self::new();
        for bench in benches {
            this.add_bench(bench.clone());
        }
        this
    }

    pub fn run(&mut self) {
        for bench in &self.benches {
            let total = bench.run();
            self.results.push(BenchResult {
                name: bench.name.to_string(),
                iterations: bench.iterations,
                pixels: bench.pixels,
                total,
            });
            print!(".");
            stdout().flush().unwrap();
        }
        println!();
        stdout().flush().unwrap();
    }

    pub fn show(&self) {
        println!(
            "  {: <34} {: >8}   {: >8}   {: >8}",
            "benchmark", "total", "per_call", "Mpx/s"
        );
        for r in &self.results {
            let per_call = r.per_call();
            println!(
                "  {: <34} {}   {}   {:>8.2}",
                r.name,
                Unit::scaled(&r.total, 100000).format(&r.total, 6),
                Unit::scaled(&per_call, 100000).format(&per_call, 6),
                r.mpx_per_sec(),
            )
        }
        stdout().flush().unwrap();
    }

    pub fn write_csv(&self, filename: &str) {
        let mut lines: Vec<String> =
            vec!["benchmark,total_us,iterations,per_call_us,mpx_per_sec".to_string()];
        for r in &self.results {
            lines.push(format!(
                "{},{},{},{},{:.3}",
                r.name,
                r.total.as_micros(),
                r.iterations,
                r.per_call().as_micros(),
                r.mpx_per_sec(),
            ));
        }
        lines.push("".to_string());
        fs::write(filename, lines.join("\n")).unwrap();
    }

    pub fn report(&mut self, name: &str) {
        print!("Benchmark: {}", name);
        self.run();
        self.show();
        self.write_csv(&format!("benchmark_{}.csv", name))
    }
}
