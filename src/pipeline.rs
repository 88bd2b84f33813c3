//! End to end processing: observations in, position fixes out.
use std::collections::HashMap;

use itertools::Itertools;
use log::{debug, info, warn};

use crate::archive::{EphemerisSource, GpsWeekDay};
use crate::cfg::Config;
use crate::error::Error;
use crate::obs::{self, ObservationEpoch};
use crate::solutions::EpochSolution;
use crate::solver;
use crate::sp3::{self, Sp3Epoch};

/// A published product epoch covers observations up to this far after it.
const EPHEMERIS_WINDOW_MIN: u8 = 15;

/// Sequences the whole pipeline over one uploaded observation file.
/// One instance per ephemeris session; each [Pipeline::run] call owns all
/// of its per request data and its own retrieval cache.
pub struct Pipeline<S: EphemerisSource> {
    cfg: Config,
    source: S,
}

impl<S: EphemerisSource> Pipeline<S> {
    pub fn new(cfg: Config, source: S) -> Self {
        Self { cfg, source }
    }

    /// Grants access to the underlying provider.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Processes raw observation bytes into one [EpochSolution] per
    /// recognized epoch (bounded by `cfg.max_epochs`).
    ///
    /// Failures are scoped to the smallest possible unit: a retrieval or
    /// solving failure annotates the affected epochs and leaves the others
    /// alone. Only a file with no recognizable epoch fails the request.
    pub fn run(&mut self, bytes: &[u8]) -> Result<Vec<EpochSolution>, Error> {
        let epochs = obs::parse(bytes, self.cfg.max_epochs);
        if epochs.is_empty() {
            return Err(Error::NoEpochs);
        }
        info!("processing {} observation epoch(s)", epochs.len());

        // resolve archive keys; an unresolvable date only poisons its epoch
        let keys: Vec<Result<GpsWeekDay, Error>> = epochs
            .iter()
            .map(|e| GpsWeekDay::from_calendar(e.year, e.month, e.day))
            .collect();

        // fetch each distinct key at most once; the cache lives for this
        // run only, since archive contents may be republished
        let mut products = HashMap::<GpsWeekDay, Result<Vec<Sp3Epoch>, Error>>::new();
        for key in keys.iter().filter_map(|k| k.as_ref().ok()).copied().unique() {
            debug!("fetching ephemerides for {}", key);
            let fetched = self.source.fetch(key).map(|bytes| sp3::parse(&bytes));
            if let Err(e) = &fetched {
                warn!("{}: retrieval failed: {}", key, e);
            }
            products.insert(key, fetched);
        }

        let solutions = epochs
            .iter()
            .zip(keys)
            .map(|(epoch, key)| {
                let fix = key.and_then(|k| match products.get(&k) {
                    Some(Ok(file)) => select_ephemerides(epoch, file)
                        .ok_or(Error::NoEphemerisEpoch)
                        .and_then(|sp3_epoch| solver::resolve(epoch, sp3_epoch, &self.cfg)),
                    Some(Err(e)) => Err(e.clone()),
                    None => Err(Error::NoEphemerisEpoch),
                });
                if let Err(e) = &fix {
                    warn!(
                        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}: {}",
                        epoch.year, epoch.month, epoch.day, epoch.hour, epoch.minute,
                        epoch.second, e
                    );
                }
                EpochSolution {
                    year: epoch.year,
                    month: epoch.month,
                    day: epoch.day,
                    hour: epoch.hour,
                    minute: epoch.minute,
                    second: epoch.second,
                    fix,
                }
            })
            .collect();

        Ok(solutions)
    }
}

/// Picks the product epoch covering this observation: same calendar hour,
/// published at most [EPHEMERIS_WINDOW_MIN] minutes before it. The closest
/// preceding publication wins when several qualify.
fn select_ephemerides<'a>(
    epoch: &ObservationEpoch,
    file: &'a [Sp3Epoch],
) -> Option<&'a Sp3Epoch> {
    file.iter()
        .filter(|s| {
            s.year == epoch.year
                && s.month == epoch.month
                && s.day == epoch.day
                && s.hour == epoch.hour
                && s.minute <= epoch.minute
                && epoch.minute as i32 - EPHEMERIS_WINDOW_MIN as i32 <= s.minute as i32
        })
        .max_by_key(|s| s.minute)
}
