use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Context};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info, trace, warn};
use symphonia::{
    core::{
        audio::SampleBuffer,
        codecs::DecoderOptions,
        errors::Error as SymphoniaError,
        formats::FormatOptions,
        io::{MediaSource, MediaSourceStream},
        meta::MetadataOptions,
        probe::Hint,
    },
    default::{get_codecs, get_probe},
};

use libencore::prelude::instrument::Player;

const ERR_PREFIX: &str = "<|SAMPLER|>::Err   |";

/// How often the calling thread checks whether the output stream has drained the clip
const TICK: Duration = Duration::from_millis(100);

/// Extra time a clip is given past its own length before playback is abandoned
const GRACE: Duration = Duration::from_secs(2);

/// A decoded clip held entirely in memory as interleaved `f32` frames
#[derive(Debug, Clone)]
pub struct Clip {
    samples: Box<[f32]>,
    channels: usize,
    sample_rate: u32,
}

impl Clip {
    pub fn from_interleaved(
        samples: Vec<f32>,
        channels: usize,
        sample_rate: u32,
    ) -> anyhow::Result<Self> {
        if channels == 0 {
            return Err(anyhow!("{ERR_PREFIX} clip has 0 channels"));
        }
        if sample_rate == 0 {
            return Err(anyhow!("{ERR_PREFIX} clip has a sample rate of 0"));
        }
        if samples.len() % channels != 0 {
            return Err(anyhow!(
                "{ERR_PREFIX} {} samples cannot be split into frames of {channels} channels",
                samples.len()
            ));
        }
        Ok(Clip {
            samples: samples.into_boxed_slice(),
            channels,
            sample_rate,
        })
    }

    /// Decodes every packet of the default track of the file at `path`
    pub fn load<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|extension| extension.to_str()) {
            hint.with_extension(extension);
        }

        let boxed_source: Box<dyn MediaSource> = Box::new(
            File::open(path)
                .with_context(|| format!("{ERR_PREFIX} while opening `{}`", path.display()))?,
        );
        let mss = MediaSourceStream::new(boxed_source, Default::default());
        let mut opened = get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .with_context(|| format!("{ERR_PREFIX} unsupported format `{}`", path.display()))?;

        let track = opened
            .format
            .default_track()
            .ok_or_else(|| anyhow!("{ERR_PREFIX} `{}` has no audio track", path.display()))?;
        let track_id = track.id;
        let mut decoder = get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .with_context(|| format!("{ERR_PREFIX} unsupported codec in `{}`", path.display()))?;

        debug::log_track(path, track);

        let mut samples = Vec::new();
        let mut spec = None;
        loop {
            let packet = match opened.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(err)) if err.kind() == io::ErrorKind::UnexpectedEof => {
                    break;
                }
                // Chained streams are not supported, the first one is the whole clip
                Err(SymphoniaError::ResetRequired) => break,
                Err(err) => return Err(anyhow!("{ERR_PREFIX} error getting next packet: {err}")),
            };
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let signal = *decoded.spec();
                    let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, signal);
                    buffer.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buffer.samples());
                    spec.get_or_insert(signal);
                }
                Err(SymphoniaError::IoError(_) | SymphoniaError::DecodeError(_)) => {
                    warn!("discarding undecodable packet in `{}`", path.display());
                }
                Err(err) => return Err(anyhow!("{ERR_PREFIX} error decoding packet: {err}")),
            }
        }

        let spec = spec
            .ok_or_else(|| anyhow!("{ERR_PREFIX} `{}` contains no audio", path.display()))?;
        Self::from_interleaved(samples, spec.channels.count(), spec.rate)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        self.samples
            .get(index * self.channels..(index + 1) * self.channels)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }
}

/// Read position into a [Clip], converting to the channel count and sample rate of the device
#[derive(Debug)]
pub struct Cursor {
    clip: Clip,
    position: f64,
    step: f64,
}

impl Cursor {
    pub fn new(clip: Clip, output_rate: u32) -> Self {
        let step = clip.sample_rate as f64 / output_rate.max(1) as f64;
        Cursor {
            clip,
            position: 0.,
            step,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.position as usize >= self.clip.frames()
    }

    /// Fills `out` with interleaved frames of `channels` channels, and silence once the clip has
    /// run out. Returns `true` only for a buffer that is entirely silence, so the buffer carrying
    /// the last frames has already been handed to the device.
    ///
    /// Output channels beyond those of the clip repeat its last channel.
    pub fn fill(&mut self, out: &mut [f32], channels: usize) -> bool {
        let drained = self.is_finished();
        for frame in out.chunks_mut(channels.max(1)) {
            match self.clip.frame(self.position as usize) {
                Some(source) => {
                    for (channel, sample) in frame.iter_mut().enumerate() {
                        *sample = source[channel.min(source.len() - 1)];
                    }
                    self.position += self.step;
                }
                None => frame.fill(0.),
            }
        }
        drained
    }
}

/// Plays clips from a directory on the default output device
#[derive(Debug, Clone)]
pub struct DevicePlayer {
    clips: PathBuf,
}

impl DevicePlayer {
    pub fn new<P>(clips: P) -> Self
    where
        P: AsRef<Path>,
    {
        DevicePlayer {
            clips: clips.as_ref().to_path_buf(),
        }
    }

    fn play_clip(&self, clip: Clip) -> anyhow::Result<()> {
        let device = cpal::default_host()
            .default_output_device()
            .ok_or_else(|| anyhow!("{ERR_PREFIX} no default output device found"))?;
        let config = device
            .default_output_config()
            .context(format!("{ERR_PREFIX} output device has no usable configuration"))?
            .config();
        let channels = config.channels as usize;

        let duration = clip.duration();
        info!(
            "playing {duration:?} of audio ({} ch @ {} Hz) on {} ch @ {} Hz",
            clip.channels(),
            clip.sample_rate(),
            channels,
            config.sample_rate.0
        );

        let finished = Arc::new(AtomicBool::new(false));
        let finished_signal = Arc::clone(&finished);
        let mut cursor = Cursor::new(clip, config.sample_rate.0);
        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if cursor.fill(data, channels) {
                        finished_signal.store(true, Ordering::SeqCst);
                    }
                },
                |err| error!("{ERR_PREFIX} output stream: {err}"),
                None,
            )
            .context(format!("{ERR_PREFIX} while opening the output stream"))?;
        stream
            .play()
            .context(format!("{ERR_PREFIX} while starting the output stream"))?;

        let deadline = Instant::now() + duration + GRACE;
        while !finished.load(Ordering::SeqCst) {
            if Instant::now() >= deadline {
                return Err(anyhow!(
                    "{ERR_PREFIX} output device stopped consuming audio"
                ));
            }
            thread::sleep(TICK);
        }
        trace!("clip drained");
        Ok(())
    }
}

impl Player for DevicePlayer {
    fn play(&mut self, clip: &str) -> anyhow::Result<()> {
        let path = self.clips.join(clip);
        let decoded = Clip::load(&path)?;
        self.play_clip(decoded)
            .with_context(|| format!("while playing `{}`", path.display()))
    }
}

/// Resolves clips like [DevicePlayer] but only logs them, for machines without an output device
#[derive(Debug, Clone)]
pub struct MutePlayer {
    clips: PathBuf,
}

impl MutePlayer {
    pub fn new<P>(clips: P) -> Self
    where
        P: AsRef<Path>,
    {
        MutePlayer {
            clips: clips.as_ref().to_path_buf(),
        }
    }
}

impl Player for MutePlayer {
    fn play(&mut self, clip: &str) -> anyhow::Result<()> {
        let path = self.clips.join(clip);
        if !path.is_file() {
            warn!("`{}` does not exist", path.display());
        }
        info!("(muted) {}", path.display());
        Ok(())
    }
}

mod debug {
    use std::path::Path;

    use log::debug;
    use symphonia::core::formats::Track;

    pub fn log_track(path: &Path, track: &Track) {
        let params = &track.codec_params;
        let codec = symphonia::default::get_codecs()
            .get_codec(params.codec)
            .map(|codec| codec.long_name.to_string())
            .unwrap_or_else(|| format!("Unknown (#{})", params.codec));

        debug!(
            "`{}`: codec {codec}, sample rate {:?}, frames {:?}, channels {:?}",
            path.display(),
            params.sample_rate,
            params.n_frames,
            params.channels.map(|channels| channels.count()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(name: &str, channels: u16, sample_rate: u32, frames: usize) -> PathBuf {
        let path = std::env::temp_dir().join(format!("sampler-{}-{name}.wav", std::process::id()));
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..frames {
            for _ in 0..channels {
                writer.write_sample(i16::MAX / 2).unwrap();
            }
        }
        writer.finalize().unwrap();
        path
    }

    #[test]
    fn test_load_wav() {
        let path = write_wav("stereo", 2, 8000, 400);
        let clip = Clip::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(clip.channels(), 2);
        assert_eq!(clip.sample_rate(), 8000);
        assert_eq!(clip.frames(), 400);
        assert!((clip.duration().as_secs_f64() - 0.05).abs() < 1e-6);
        let first = clip.frame(0).unwrap();
        assert!((first[0] - 0.5).abs() < 0.01);
        assert!((first[1] - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Clip::load("definitely/not/here.wav").unwrap_err();
        assert!(err.to_string().contains("definitely/not/here.wav"));
    }

    #[test]
    fn test_from_interleaved_rejects_partial_frames() {
        assert!(Clip::from_interleaved(vec![0.; 3], 2, 44100).is_err());
        assert!(Clip::from_interleaved(vec![0.; 4], 0, 44100).is_err());
        assert!(Clip::from_interleaved(vec![0.; 4], 2, 0).is_err());
        assert_eq!(
            Clip::from_interleaved(vec![0.; 4], 2, 44100)
                .unwrap()
                .frames(),
            2
        );
    }

    #[test]
    fn test_cursor_mono_to_stereo() {
        let clip = Clip::from_interleaved(vec![0.1, 0.2, 0.3], 1, 100).unwrap();
        let mut cursor = Cursor::new(clip, 100);

        let mut out = [1.; 4];
        assert!(!cursor.fill(&mut out, 2));
        assert_eq!(out, [0.1, 0.1, 0.2, 0.2]);

        assert!(!cursor.fill(&mut out, 2));
        assert_eq!(out, [0.3, 0.3, 0., 0.]);
        assert!(cursor.is_finished());
    }

    #[test]
    fn test_cursor_drains_after_a_silent_buffer() {
        let clip = Clip::from_interleaved(vec![0.1, 0.2], 1, 100).unwrap();
        let mut cursor = Cursor::new(clip, 100);

        // the last frames go out in this buffer, which the device has yet to play
        let mut out = [1.; 2];
        assert!(!cursor.fill(&mut out, 1));
        assert_eq!(out, [0.1, 0.2]);
        assert!(cursor.is_finished());

        assert!(cursor.fill(&mut out, 1));
        assert_eq!(out, [0., 0.]);
        assert!(cursor.fill(&mut out, 1));
    }

    #[test]
    fn test_cursor_stereo_to_mono() {
        let clip = Clip::from_interleaved(vec![0.1, 0.9, 0.2, 0.8], 2, 100).unwrap();
        let mut cursor = Cursor::new(clip, 100);

        let mut out = [1.; 3];
        assert!(!cursor.fill(&mut out, 1));
        assert_eq!(out, [0.1, 0.2, 0.]);
        assert!(cursor.fill(&mut out, 1));
    }

    #[test]
    fn test_cursor_resamples() {
        let clip = Clip::from_interleaved(vec![0.1, 0.2, 0.3, 0.4], 1, 100).unwrap();

        // device runs twice as fast as the clip, so every frame is held for two
        let mut slow = Cursor::new(clip.clone(), 200);
        let mut out = [0.; 8];
        assert!(!slow.fill(&mut out, 1));
        assert_eq!(out, [0.1, 0.1, 0.2, 0.2, 0.3, 0.3, 0.4, 0.4]);
        assert!(slow.is_finished());

        // device runs at half the rate, so every other frame is skipped
        let mut fast = Cursor::new(clip, 50);
        let mut out = [0.; 3];
        assert!(!fast.fill(&mut out, 1));
        assert_eq!(out, [0.1, 0.3, 0.]);
        assert!(fast.is_finished());
    }

    #[test]
    fn test_mute_player_never_fails() {
        let mut player = MutePlayer::new("no-such-directory");
        assert!(player.play("guitar_tuned.wav").is_ok());
    }
}
