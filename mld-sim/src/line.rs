//! Event engine for one run of the line.

use crate::{Distributions, SimulationConfig};
use log::trace;
use mld_data::SimulationRun;
use mld_utils::stats::{clamp_unit, mean};
use rand::Rng;
use rand_distr::Distribution;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

#[derive(Debug, Clone, Copy)]
enum Event {
    Arrival,
    RestockDone { station: usize, product: usize },
    ProcessDone { station: usize, product: usize, duration: f64 },
    RepairDone { station: usize, product: usize },
}

#[derive(Debug)]
struct Scheduled {
    time: f64,
    seq: u64,
    event: Event,
}

// Reversed so the heap pops the earliest event; ties keep insertion order.
impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

struct Station {
    failure_probability: f64,
    /// Holding a product, whether processing, restocking or under repair.
    occupied: bool,
    queue: VecDeque<usize>,
    stock: u32,
    processed: u64,
    busy_time: f64,
}

#[derive(Default)]
struct Product {
    /// Stations already passed.
    visited: usize,
    /// Pair station taken first.
    first_pair: Option<usize>,
}

pub(crate) struct Line<'a, R: Rng> {
    config: &'a SimulationConfig,
    distributions: &'a Distributions,
    rng: &'a mut R,
    now: f64,
    seq: u64,
    events: BinaryHeap<Scheduled>,
    stations: Vec<Station>,
    products: Vec<Product>,
    free_restockers: usize,
    restock_queue: VecDeque<(usize, usize)>,
    restock_waits: u64,
    supply_busy: f64,
    repairs: Vec<f64>,
    completed: u64,
    rejected: u64,
}

impl<'a, R: Rng> Line<'a, R> {
    pub(crate) fn new(
        config: &'a SimulationConfig,
        distributions: &'a Distributions,
        rng: &'a mut R,
    ) -> Self {
        let stations = config
            .failure_probabilities
            .iter()
            .map(|p| Station {
                failure_probability: *p,
                occupied: false,
                queue: VecDeque::new(),
                stock: config.stock_capacity,
                processed: 0,
                busy_time: 0.0,
            })
            .collect();
        Self {
            config,
            distributions,
            rng,
            now: 0.0,
            seq: 0,
            events: BinaryHeap::new(),
            stations,
            products: Vec::new(),
            free_restockers: config.restockers,
            restock_queue: VecDeque::new(),
            restock_waits: 0,
            supply_busy: 0.0,
            repairs: Vec::new(),
            completed: 0,
            rejected: 0,
        }
    }

    /// Process every event before the horizon and summarise the run.
    pub(crate) fn run(mut self) -> SimulationRun {
        let first = self.distributions.interarrival.sample(&mut *self.rng);
        self.schedule(first, Event::Arrival);
        while let Some(next) = self.events.peek() {
            if next.time >= self.config.horizon {
                break;
            }
            let Some(Scheduled { time, event, .. }) = self.events.pop() else {
                break;
            };
            self.now = time;
            trace!("simulation: t={:.2} {:?}", time, event);
            match event {
                Event::Arrival => self.arrival(),
                Event::RestockDone { station, product } => self.restock_done(station, product),
                Event::ProcessDone { station, product, duration } => {
                    self.process_done(station, product, duration)
                }
                Event::RepairDone { station, product } => self.release(station, product),
            }
        }
        self.summary()
    }

    fn schedule(&mut self, delay: f64, event: Event) {
        self.seq += 1;
        self.events.push(Scheduled {
            time: self.now + delay,
            seq: self.seq,
            event,
        });
    }

    fn normal_duration(&mut self, restock: bool) -> f64 {
        let distributions = self.distributions;
        let dist = if restock {
            &distributions.restock
        } else {
            &distributions.process
        };
        dist.sample(&mut *self.rng).max(0.0)
    }

    fn arrival(&mut self) {
        let product = self.products.len();
        self.products.push(Product::default());
        self.advance(product);
        let gap = self.distributions.interarrival.sample(&mut *self.rng);
        self.schedule(gap, Event::Arrival);
    }

    /// Station the product visits next, or `None` when it has passed all.
    fn next_station(&self, product: usize) -> Option<usize> {
        let n = self.stations.len();
        let (a, b) = (n - 2, n - 1);
        let p = &self.products[product];
        match p.visited {
            v if v < a => Some(v),
            v if v == a => {
                if self.stations[b].queue.len() < self.stations[a].queue.len() {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            v if v == b => p.first_pair.map(|first| if first == a { b } else { a }),
            _ => None,
        }
    }

    fn advance(&mut self, product: usize) {
        match self.next_station(product) {
            Some(station) => self.request(station, product),
            None => self.finish(),
        }
    }

    fn request(&mut self, station: usize, product: usize) {
        if self.stations[station].occupied {
            self.stations[station].queue.push_back(product);
        } else {
            self.start(station, product);
        }
    }

    fn start(&mut self, station: usize, product: usize) {
        self.stations[station].occupied = true;
        if self.stations[station].stock == 0 {
            self.restock_waits += 1;
            if self.free_restockers > 0 {
                self.free_restockers -= 1;
                self.start_restock(station, product);
            } else {
                self.restock_queue.push_back((station, product));
            }
        } else {
            self.begin(station, product);
        }
    }

    /// Caller has already taken the restocker.
    fn start_restock(&mut self, station: usize, product: usize) {
        let duration = self.normal_duration(true);
        self.supply_busy += duration;
        self.schedule(duration, Event::RestockDone { station, product });
    }

    fn restock_done(&mut self, station: usize, product: usize) {
        self.stations[station].stock = self.config.stock_capacity;
        match self.restock_queue.pop_front() {
            Some((waiting, held)) => self.start_restock(waiting, held),
            None => self.free_restockers += 1,
        }
        self.begin(station, product);
    }

    fn begin(&mut self, station: usize, product: usize) {
        self.stations[station].stock -= 1;
        let duration = self.normal_duration(false);
        self.schedule(duration, Event::ProcessDone { station, product, duration });
    }

    fn process_done(&mut self, station: usize, product: usize, duration: f64) {
        let s = &mut self.stations[station];
        s.busy_time += duration;
        s.processed += 1;
        let check = s.processed % self.config.failure_check_interval == 0;
        let probability = s.failure_probability;
        if check && self.rng.gen::<f64>() < probability {
            let repair = self.distributions.repair.sample(&mut *self.rng);
            self.repairs.push(repair);
            self.schedule(repair, Event::RepairDone { station, product });
        } else {
            self.release(station, product);
        }
    }

    fn release(&mut self, station: usize, product: usize) {
        let n = self.stations.len();
        self.stations[station].occupied = false;
        if let Some(next) = self.stations[station].queue.pop_front() {
            self.start(station, next);
        }
        let p = &mut self.products[product];
        if station >= n - 2 && p.first_pair.is_none() {
            p.first_pair = Some(station);
        }
        p.visited += 1;
        self.advance(product);
    }

    fn finish(&mut self) {
        if self.rng.gen::<f64>() < self.config.reject_probability {
            self.rejected += 1;
        } else {
            self.completed += 1;
        }
    }

    fn summary(&self) -> SimulationRun {
        let horizon = self.config.horizon;
        let station_occupancy: Vec<f64> = self
            .stations
            .iter()
            .map(|s| clamp_unit(s.busy_time / horizon))
            .collect();
        let station_idle = station_occupancy
            .iter()
            .map(|occupancy| horizon * (1.0 - occupancy))
            .collect();
        let ratio = |num: f64, den: f64| if den > 0.0 { num / den } else { 0.0 };
        SimulationRun {
            produced: self.completed as f64,
            station_occupancy,
            station_idle,
            failure_downtime: self.repairs.iter().sum(),
            supply_occupancy: self.supply_busy / horizon,
            avg_repair_time: mean(&self.repairs).unwrap_or(0.0),
            avg_delay: ratio(self.supply_busy, self.restock_waits as f64),
            defect_rate: ratio(self.rejected as f64, self.completed as f64),
        }
    }
}
