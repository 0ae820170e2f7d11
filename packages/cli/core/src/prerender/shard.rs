/* packages/cli/core/src/prerender/shard.rs */

// Round-robin partitioner used to stripe route batches across render workers.

/// Split `items` into at most `max_shards` shards. Shard `i` takes every item
/// whose original index is congruent to `i` modulo the shard count, so shard
/// sizes never differ by more than one and relative order is kept within each
/// shard. A non-positive `max_shards` yields no shards at all.
pub fn shard_array<T: Clone>(items: &[T], max_shards: i64) -> Vec<Vec<T>> {
  let effective = max_shards.min(items.len() as i64);
  if effective <= 0 {
    return Vec::new();
  }
  let effective = effective as usize;
  (0..effective).map(|i| items.iter().skip(i).step_by(effective).cloned().collect()).collect()
}

/// Default shard count: available parallelism minus one, floor 1. Kept as an
/// explicit function so callers never read host state inline.
pub fn default_shard_count() -> usize {
  std::thread::available_parallelism().map(|n| n.get()).unwrap_or(2).saturating_sub(1).max(1)
}
