use log::debug;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::machine::Machine;

/// Boot one amplifier per phase setting. Each amplifier consumes its phase
/// and then waits for its first signal.
fn boot(image: &[i64], phases: &[i64]) -> Result<Vec<Machine>> {
    phases
        .iter()
        .map(|&phase| {
            let mut amp = Machine::new(image.to_vec());
            amp.run([phase])?;
            Ok(amp)
        })
        .collect()
}

/// Pass `signal` through every amplifier once, in order.
fn pass(amps: &mut [Machine], mut signal: i64) -> Result<i64> {
    for (i, amp) in amps.iter_mut().enumerate() {
        amp.resume([signal])?;
        signal = amp
            .drain_output()
            .last()
            .copied()
            .ok_or_else(|| Error::Protocol(format!("amplifier {i} produced no signal")))?;
    }
    Ok(signal)
}

/// Run the amplifiers in series, feeding 0 into the first one, and return the
/// signal coming out of the last.
pub fn chain(image: &[i64], phases: &[i64]) -> Result<i64> {
    let mut amps = boot(image, phases)?;
    pass(&mut amps, 0)
}

/// Run the amplifiers in a loop, the last one's output feeding the first,
/// until the last amplifier halts. Returns its final signal.
pub fn feedback(image: &[i64], phases: &[i64]) -> Result<i64> {
    let mut amps = boot(image, phases)?;
    let mut signal = 0;
    let mut rounds = 0usize;
    loop {
        signal = pass(&mut amps, signal)?;
        rounds += 1;
        match amps.last() {
            Some(last) if last.is_running() => {}
            _ => break,
        }
    }
    debug!("feedback loop settled after {rounds} rounds with signal {signal}");
    Ok(signal)
}

/// Every ordering of `items`, by Heap's algorithm.
pub fn permutations(items: &[i64]) -> Vec<Vec<i64>> {
    fn heap(k: usize, items: &mut Vec<i64>, out: &mut Vec<Vec<i64>>) {
        if k <= 1 {
            out.push(items.clone());
            return;
        }
        for i in 0..k - 1 {
            heap(k - 1, items, out);
            if k % 2 == 0 {
                items.swap(i, k - 1);
            } else {
                items.swap(0, k - 1);
            }
        }
        heap(k - 1, items, out);
    }

    let mut items = items.to_vec();
    let mut out = Vec::new();
    heap(items.len(), &mut items, &mut out);
    out
}

/// Best signal over every ordering of `phases`, together with that ordering.
/// Orderings are evaluated in parallel.
fn best(
    image: &[i64],
    phases: &[i64],
    run: fn(&[i64], &[i64]) -> Result<i64>,
) -> Result<Option<(i64, Vec<i64>)>> {
    let results = permutations(phases)
        .into_par_iter()
        .map(|order| run(image, &order).map(|signal| (signal, order)))
        .collect::<Result<Vec<_>>>()?;
    Ok(results.into_iter().max_by_key(|(signal, _)| *signal))
}

pub fn best_chain(image: &[i64], phases: &[i64]) -> Result<Option<(i64, Vec<i64>)>> {
    best(image, phases, chain)
}

pub fn best_feedback(image: &[i64], phases: &[i64]) -> Result<Option<(i64, Vec<i64>)>> {
    best(image, phases, feedback)
}
