use shadow_share::evaluator::evaluation_point;
use shadow_share::polynomial::{evaluate, interpolate};
use shadow_share::{
    Bitmap, Config, EmbedDepth, FiniteField, Result, ShadowError, ShadowGenerator, ShadowStore,
    SplitMode, embedder,
};
use std::collections::BTreeSet;
use std::io;
use std::sync::Mutex;

/// In-memory store recording every shadow written
struct MemoryStore {
    covers: Vec<Bitmap>,
    written: Mutex<Vec<Option<Bitmap>>>,
}

impl MemoryStore {
    fn new(covers: Vec<Bitmap>) -> Self {
        let written = Mutex::new(vec![None; covers.len()]);
        Self { covers, written }
    }

    fn written(&self, index: usize) -> Bitmap {
        self.written.lock().unwrap()[index]
            .clone()
            .expect("shadow not stored")
    }
}

impl ShadowStore for MemoryStore {
    fn cover_count(&self) -> usize {
        self.covers.len()
    }

    fn load_cover(&self, index: usize) -> Result<Bitmap> {
        Ok(self.covers[index].clone())
    }

    fn store_shadow(&self, index: usize, shadow: &Bitmap) -> Result<()> {
        let mut written = self.written.lock().unwrap();
        assert!(written[index].is_none(), "cover {index} written twice");
        written[index] = Some(shadow.clone());
        Ok(())
    }
}

/// Store whose write for one cover index always fails
struct FailingStore {
    inner: MemoryStore,
    fail_at: usize,
}

impl ShadowStore for FailingStore {
    fn cover_count(&self) -> usize {
        self.inner.cover_count()
    }

    fn load_cover(&self, index: usize) -> Result<Bitmap> {
        self.inner.load_cover(index)
    }

    fn store_shadow(&self, index: usize, shadow: &Bitmap) -> Result<()> {
        if index == self.fail_at {
            return Err(io::Error::other("disk full").into());
        }
        self.inner.store_shadow(index, shadow)
    }
}

fn cover(fill: u8, len: usize) -> Bitmap {
    let pixels = vec![fill; len];
    Bitmap::blank(len as u32, 1, 8)
        .unwrap()
        .with_pixels(&pixels)
        .unwrap()
}

#[test]
fn test_k3_n5_four_byte_secret() {
    // One block of 2k - 2 = 4 bytes: A = [10, 20, 30], B = [b0, b1, 40]
    let secret = Bitmap::blank(4, 1, 8)
        .unwrap()
        .with_pixels(&[10, 20, 30, 40])
        .unwrap();
    let covers: Vec<Bitmap> = (0..5).map(|i| cover(0x90 + i as u8, 8)).collect();
    let store = MemoryStore::new(covers.clone());

    let mut generator = ShadowGenerator::builder(5, 3)
        .with_config(Config::new().with_seed(31337))
        .build()
        .unwrap();
    let shadows = generator.distribute(&secret, &store).unwrap();

    // Identities are exactly {1..5}
    let numbers: BTreeSet<u8> = shadows.iter().map(|s| s.number).collect();
    assert_eq!(numbers, (1..=5).collect());

    for (index, shadow) in shadows.iter().enumerate() {
        assert_eq!(shadow.points.len(), 2);

        // P_A(x) is fully determined by the secret
        let x = FiniteField::new(shadow.number);
        assert_eq!(shadow.points[0], evaluate(&[10, 20, 30], x).value());

        let written = store.written(index);
        assert_eq!(written.shadow_number(), u16::from(shadow.number));

        // Only the low nibble of the first four pixel bytes may change
        let before = covers[index].pixels();
        let after = written.pixels();
        for i in 0..4 {
            assert_eq!(before[i] & 0xF0, after[i] & 0xF0);
        }
        assert_eq!(&before[4..], &after[4..]);

        assert_eq!(
            embedder::extract(after, 2, EmbedDepth::Lsb4).unwrap(),
            shadow.points
        );
    }

    // Any three shadows recover A and the trailing byte of B
    let subset = [&shadows[4], &shadows[0], &shadows[2]];
    let a_points: Vec<_> = subset
        .iter()
        .map(|s| (evaluation_point(s.number), FiniteField::new(s.points[0])))
        .collect();
    let b_points: Vec<_> = subset
        .iter()
        .map(|s| (evaluation_point(s.number), FiniteField::new(s.points[1])))
        .collect();

    let a = interpolate(&a_points).unwrap();
    assert_eq!(a, [10, 20, 30].map(FiniteField::new));

    let b = interpolate(&b_points).unwrap();
    assert_eq!(b[2].value(), 40);
    // Blinded pair satisfies b0 * a1 == b1 * a0
    assert_eq!(b[0] * FiniteField::new(20), b[1] * FiniteField::new(10));
}

#[test]
fn test_lsb2_thresholds_use_four_cover_bytes() {
    for k in [2u8, 5, 6] {
        let block = 2 * k as usize - 2;
        let pixels: Vec<u8> = (0..block * 3).map(|i| (i * 13) as u8).collect();
        let secret = Bitmap::blank(pixels.len() as u32, 1, 8)
            .unwrap()
            .with_pixels(&pixels)
            .unwrap();

        let stream_len = 2 * 3;
        let covers: Vec<Bitmap> = (0..6).map(|_| cover(0xFF, stream_len * 4)).collect();
        let store = MemoryStore::new(covers);

        let mut generator = ShadowGenerator::builder(6, k)
            .with_config(Config::new().with_mode(SplitMode::Sequential))
            .build()
            .unwrap();
        let shadows = generator.distribute(&secret, &store).unwrap();

        for (index, shadow) in shadows.iter().enumerate() {
            let written = store.written(index);
            assert!(written.pixels().iter().all(|&p| p & 0xFC == 0xFC));
            let hidden = embedder::extract(written.pixels(), stream_len, EmbedDepth::Lsb2);
            assert_eq!(hidden.unwrap(), shadow.points);
        }
    }
}

#[test]
fn test_small_cover_rejected_before_any_write() {
    let secret = Bitmap::blank(8, 1, 8).unwrap();
    // k = 3: 2 blocks -> 4 share bytes -> 8 cover bytes needed
    let mut covers: Vec<Bitmap> = (0..4).map(|_| cover(0, 8)).collect();
    covers[3] = cover(0, 7);
    let store = MemoryStore::new(covers);

    let mut generator = ShadowGenerator::new(4, 3).unwrap();
    let result = generator.distribute(&secret, &store);
    assert!(matches!(
        result,
        Err(ShadowError::CoverTooSmall {
            shadow: 4,
            needed: 8,
            available: 7
        })
    ));
    assert!(store.written.lock().unwrap().iter().all(Option::is_none));
}

#[test]
fn test_sequential_and_parallel_runs_match() {
    // 20 blocks of 12 bytes for k = 7
    let pixels: Vec<u8> = (0..240u8).collect();
    let secret = Bitmap::blank(240, 1, 8)
        .unwrap()
        .with_pixels(&pixels)
        .unwrap();

    let run = |mode| {
        let covers = (0..7).map(|_| cover(0x42, 1024)).collect();
        let store = MemoryStore::new(covers);
        let mut generator = ShadowGenerator::builder(7, 7)
            .with_config(Config::new().with_mode(mode).with_seed(77))
            .build()
            .unwrap();
        let shadows = generator.distribute(&secret, &store).unwrap();
        let images: Vec<Bitmap> = (0..7).map(|i| store.written(i)).collect();
        (shadows, images)
    };

    assert_eq!(run(SplitMode::Sequential), run(SplitMode::Parallel));
}

#[test]
fn test_failed_write_aborts_without_rollback() {
    let secret = Bitmap::blank(8, 1, 8).unwrap();
    let covers: Vec<Bitmap> = (0..4).map(|_| cover(0x10, 16)).collect();
    let store = FailingStore {
        inner: MemoryStore::new(covers),
        fail_at: 2,
    };

    let mut generator = ShadowGenerator::builder(4, 3)
        .with_config(Config::new().with_mode(SplitMode::Sequential))
        .build()
        .unwrap();

    match generator.distribute(&secret, &store) {
        Err(ShadowError::IoError(e)) => assert_eq!(e.to_string(), "disk full"),
        other => panic!("expected the write error, got {other:?}"),
    }

    // Shadows written before the failure stay in place
    let written = store.inner.written.lock().unwrap();
    for (index, slot) in written.iter().enumerate() {
        match slot {
            Some(bitmap) => {
                assert!(index < 2);
                assert_eq!(bitmap.shadow_number(), index as u16 + 1);
            }
            None => assert!(index >= 2),
        }
    }
    assert_eq!(written.iter().flatten().count(), 2);
}
