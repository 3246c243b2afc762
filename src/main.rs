use clap::{arg, ArgMatches, Command};

use wavelet_denoise::denoise::{denoise_file, extract_noise_profile};
use wavelet_denoise::signal::{generate_signal, SignalType};
use wavelet_denoise::utils::{add_noise, peak_normalize};
use wavelet_denoise::wav::{read_wav, write_wav, Signal};
use wavelet_denoise::wavelet::Wavelet;

use std::error::Error;
use std::process;

mod eval;

fn main() {
    env_logger::init();
    let matches = Command::new("Wavelet Denoising CLI")
        .version("1.0")
        .about("VisuShrink wavelet denoising for WAV files")
        .subcommand(
            Command::new("denoise")
                .about("Denoise a WAV file chunk by chunk")
                .arg(arg!(<INPUT> "Input WAV path"))
                .arg(arg!(<OUTPUT> "Output WAV path"))
                .arg(arg!(-w --"wavelet" <NAME> "Wavelet: haar|db2|db4|db8").default_value("db4"))
                .arg(arg!(-l --"level" <N> "Decomposition level").default_value("2"))
                .arg(arg!(-c --"chunk-fraction" <F> "Chunk size as a fraction of the signal").default_value("0.10")),
        )
        .subcommand(
            Command::new("noise-profile")
                .about("Extract the removed-noise estimate from a noise-only recording")
                .arg(arg!(<NOISE_SAMPLE> "Noise-only WAV path"))
                .arg(arg!(<OUTPUT> "Output WAV path"))
                .arg(arg!(-w --"wavelet" <NAME> "Wavelet: haar|db2|db4|db8").default_value("db4"))
                .arg(arg!(-l --"level" <N> "Decomposition level").default_value("2")),
        )
        .subcommand(
            Command::new("sig-gen")
                .about("Generate a synthetic signal and save to WAV")
                .arg(arg!(-t --"type" <TYPE> "Signal type: white|gaussian,0.06|sine,440.0|chirp,200,800").required(true))
                .arg(arg!(-d --"duration" <DUR> "Duration in seconds").required(true))
                .arg(arg!(-r --"sample-rate" <SR> "Sample rate in Hz").default_value("44100"))
                .arg(arg!(-a --"amplitude" <AMP> "Peak amplitude after normalization").default_value("0.8"))
                .arg(arg!(-o --"out-file" <FILE> "Output WAV path").default_value("output.wav")),
        )
        .subcommand(
            Command::new("mix")
                .about("Mix clean and noise signals")
                .arg(arg!(-c --"clean" <FILE> "Path to clean WAV").required(true))
                .arg(arg!(-n --"noise" <FILE> "Path to noise WAV").required(true))
                .arg(arg!(-l --"noise-level" <VAL> "Noise level multiplier").default_value("1.0"))
                .arg(arg!(-o --"out-file" <FILE> "Output WAV path").default_value("mixed.wav")),
        )
        .subcommand(Command::new("eval").about("Run the synthetic evaluation sweep"))
        .get_matches();

    let result: Result<(), Box<dyn Error>> = match matches.subcommand() {
        Some(("denoise", m)) => handle_denoise(m),
        Some(("noise-profile", m)) => handle_noise_profile(m),
        Some(("sig-gen", m)) => handle_sig_gen(m),
        Some(("mix", m)) => handle_mix(m),
        Some(("eval", _)) => eval::run(),
        _ => {
            eprintln!("Unknown command. Use --help.");
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn parse_wavelet(m: &ArgMatches) -> Result<Wavelet, Box<dyn Error>> {
    Ok(m.get_one::<String>("wavelet").unwrap().parse::<Wavelet>()?)
}

fn handle_denoise(m: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let input = m.get_one::<String>("INPUT").unwrap();
    let output = m.get_one::<String>("OUTPUT").unwrap();
    let wavelet = parse_wavelet(m)?;
    let level: usize = m.get_one::<String>("level").unwrap().parse()?;
    let chunk_fraction: f64 = m.get_one::<String>("chunk-fraction").unwrap().parse()?;
    denoise_file(input, output, wavelet, level, chunk_fraction)?;
    println!("Denoised {} -> {}", input, output);
    Ok(())
}

fn handle_noise_profile(m: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let noise_sample = m.get_one::<String>("NOISE_SAMPLE").unwrap();
    let output = m.get_one::<String>("OUTPUT").unwrap();
    let wavelet = parse_wavelet(m)?;
    let level: usize = m.get_one::<String>("level").unwrap().parse()?;
    let signal = read_wav(noise_sample)?;
    let profile = extract_noise_profile(&signal, wavelet, level)?;
    write_wav(output, &profile)?;
    println!("Noise profile {} -> {}", noise_sample, output);
    Ok(())
}

fn handle_sig_gen(m: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let sig_type = parse_signal_type(m.get_one::<String>("type").unwrap())?;
    let duration: f64 = m.get_one::<String>("duration").unwrap().parse()?;
    let sample_rate: u32 = m.get_one::<String>("sample-rate").unwrap().parse()?;
    let amplitude: f64 = m.get_one::<String>("amplitude").unwrap().parse()?;
    let out_file = m.get_one::<String>("out-file").unwrap();

    let len = (duration * sample_rate as f64) as usize;
    let sig = generate_signal(len, sig_type, sample_rate as f64);
    let sig = peak_normalize(&sig, amplitude);
    write_wav(out_file, &Signal::mono(sig, sample_rate))?;
    println!("Generated {}s of {:?} -> {}", duration, sig_type, out_file);
    Ok(())
}

fn handle_mix(m: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let clean_file = m.get_one::<String>("clean").unwrap();
    let noise_file = m.get_one::<String>("noise").unwrap();
    let noise_level: f64 = m.get_one::<String>("noise-level").unwrap().parse()?;
    let out_file = m.get_one::<String>("out-file").unwrap();

    let clean = read_wav(clean_file)?;
    let noise = read_wav(noise_file)?;
    if clean.num_channels() != noise.num_channels() {
        return Err(format!(
            "channel count mismatch: {} vs {}",
            clean.num_channels(),
            noise.num_channels()
        )
        .into());
    }

    let channels: Vec<Vec<f64>> = clean
        .channels
        .iter()
        .zip(&noise.channels)
        .map(|(c, n)| {
            let len = c.len().min(n.len());
            add_noise(&c[..len], &n[..len], noise_level)
        })
        .collect();
    let mixed = Signal {
        channels,
        sample_rate: clean.sample_rate,
    };

    write_wav(out_file, &mixed)?;
    println!(
        "Mixed {} + {} * {} -> {}",
        clean_file, noise_file, noise_level, out_file
    );
    Ok(())
}

fn parse_signal_type(s: &str) -> Result<SignalType, Box<dyn Error>> {
    let s = s.to_lowercase();
    if s == "white" {
        Ok(SignalType::WhiteNoise)
    } else if let Some(rest) = s.strip_prefix("gaussian,") {
        Ok(SignalType::Gaussian(rest.parse()?))
    } else if let Some(rest) = s.strip_prefix("sine,") {
        Ok(SignalType::Sinusoidal(rest.parse()?))
    } else if let Some(rest) = s.strip_prefix("chirp,") {
        let parts: Vec<&str> = rest.split(',').collect();
        if parts.len() != 2 {
            return Err(format!("chirp takes two frequencies, got '{}'", rest).into());
        }
        Ok(SignalType::Chirp(parts[0].parse()?, parts[1].parse()?))
    } else {
        Err(format!("unknown signal type: {}", s).into())
    }
}
