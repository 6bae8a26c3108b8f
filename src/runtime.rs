//! Runtime: thread-local seeded RNG for deterministic weight init and test
//! fixtures. Same seed, same code path, same floats.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;

thread_local! {
    static RNG: RefCell<Option<StdRng>> = RefCell::new(None);
}

/// Set the thread-local seed. Call before any weight init or randomized
/// input source draws you want to reproduce exactly.
pub fn set_seed(seed: u64) {
    RNG.with(|rng| {
        *rng.borrow_mut() = Some(StdRng::seed_from_u64(seed));
    });
}

/// Run a closure with the thread-local RNG, seeding from 0 on first use if
/// [`set_seed`] was never called.
pub fn with_rng<F, T>(f: F) -> T
where
    F: FnOnce(&mut StdRng) -> T,
{
    RNG.with(|rng| {
        let mut opt = rng.borrow_mut();
        if opt.is_none() {
            *opt = Some(StdRng::seed_from_u64(0));
        }
        f(opt.as_mut().unwrap())
    })
}
