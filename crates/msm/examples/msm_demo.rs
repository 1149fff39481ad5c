//! Run a GPU MSM against the CPU reference and print timings.
//!
//! Usage: `cargo run --release --example msm_demo -- [n] [window_bits]`

use arith::Limbs256;
use curve::pasta::derive_bases;
use curve::reference::msm_reference;
use msm::{msm_blocking, GpuContext, MsmConfig};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let n: usize = args
        .next()
        .and_then(|a| a.parse().ok())
        .unwrap_or(1 << 12);
    let window_bits: u32 = args.next().and_then(|a| a.parse().ok()).unwrap_or(8);

    println!("deriving {n} base points...");
    let points = derive_bases(n);
    let scalars: Vec<Limbs256> = (0..n).map(|i| Limbs256::from_u64(i as u64 + 1)).collect();

    let ctx = match GpuContext::new_blocking() {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("no usable gpu: {e}");
            std::process::exit(1);
        }
    };

    let config = MsmConfig {
        window_bits,
        verbose: true,
        ..Default::default()
    };

    let started = std::time::Instant::now();
    let gpu = msm_blocking(&ctx, &scalars, &points, &config).expect("gpu msm");
    println!("gpu:  {:?} in {:.2?}", gpu, started.elapsed());

    let started = std::time::Instant::now();
    let cpu = msm_reference(&scalars, &points);
    println!("cpu:  {:?} in {:.2?}", cpu, started.elapsed());

    assert_eq!(gpu, cpu, "gpu and cpu results disagree");
    println!("results agree");
}
