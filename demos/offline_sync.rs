//! Example: two devices edit a shared settings map offline, then sync.

use lww_dict::prelude::*;

fn main() {
    println!("=== Offline edits with LWW-Element-Dictionary ===\n");

    // Both devices agree on a starting state
    let laptop = LwwDictionary::with_clock(ManualClock::new(1));
    laptop.add("theme", "light");
    laptop.add("font", "serif");

    let phone = LwwDictionary::with_clock(ManualClock::new(1));
    phone.merge(&laptop);
    println!("Shared start:  {:?}", sorted(&phone));

    // Edits made while disconnected. The phone's clock runs ahead.
    laptop.clock().set(10);
    phone.clock().set(20);

    laptop.add("theme", "dark");
    laptop.add("zoom", "125%");
    phone.remove(&"font");
    phone.add("theme", "sepia");

    println!("\n--- Offline ---");
    println!("Laptop: {:?}", sorted(&laptop));
    println!("Phone:  {:?}", sorted(&phone));

    // Sync in both directions
    laptop.merge(&phone);
    phone.merge(&laptop);

    println!("\n--- After sync ---");
    println!("Laptop: {:?}", sorted(&laptop));
    println!("Phone:  {:?}", sorted(&phone));
    println!("Converged: {}", laptop.get_all() == phone.get_all());

    // Re-adding after a removal needs a newer timestamp
    laptop.clock().set(30);
    laptop.add("font", "mono");
    let delta = laptop.delta(&phone);
    println!("\nDelta entries to ship: {}", delta.len());

    let mut phone = phone;
    phone.apply_delta(&delta);
    println!("Phone font: {:?}", phone.lookup(&"font"));
}

fn sorted(
    dict: &LwwDictionary<&'static str, &'static str, ManualClock>,
) -> Vec<(&'static str, &'static str)> {
    let mut entries: Vec<_> = dict.get_all().into_iter().collect();
    entries.sort_unstable();
    entries
}
