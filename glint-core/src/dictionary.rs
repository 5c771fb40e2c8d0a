//! The multiscale dictionary of 1D marginal slope distributions.
//!
//! The dictionary is stored on disk as one OpenEXR file per `(distribution, level)` pair named
//! `{base}_{dist:04}_{level:04}.exr`. Each file holds one distribution in its first row (RGB
//! carries three channels of distributions, alpha is ignored by the shader). All files are packed
//! into a single array with layer `level * dists_per_channel + dist`.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

/// Errors raised while building or decoding a dictionary.
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error(
        "dictionary needs 1..=31 levels and a layer count that fits in i32, got {levels} levels and {dists} distributions"
    )]
    InvalidLayout { levels: u32, dists: u32 },
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{} is empty", path.display())]
    EmptyImage { path: PathBuf },
    #[error("{} is {found} texels wide, expected {expected}", path.display())]
    WidthMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },
}

/// One file of the dictionary and the layer it lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub dist: u32,
    pub level: u32,
    pub layer: u32,
    pub path: PathBuf,
}

/// Uniform values the glint shader needs to address the dictionary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DictionaryParams {
    pub alpha: f32,
    /// Distributions over all three color channels.
    pub n: i32,
    pub n_levels: i32,
    pub pyramid0_size: i32,
}

/// The naming and indexing scheme of a dictionary on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryLayout {
    base: PathBuf,
    levels: u32,
    dists_per_channel: u32,
}

impl DictionaryLayout {
    /// Roughness the dictionary was generated for.
    pub const ALPHA: f32 = 0.5;

    pub fn new<P: Into<PathBuf>>(
        base: P,
        levels: u32,
        dists_per_channel: u32,
    ) -> Result<Self, DictionaryError> {
        let max = i32::MAX as u32;
        let fits = |n: Option<u32>| n.is_some_and(|n| n <= max);
        if !(1..=31).contains(&levels)
            || dists_per_channel == 0
            || !fits(levels.checked_mul(dists_per_channel))
            || !fits(dists_per_channel.checked_mul(3))
        {
            return Err(DictionaryError::InvalidLayout {
                levels,
                dists: dists_per_channel,
            });
        }
        Ok(Self {
            base: base.into(),
            levels,
            dists_per_channel,
        })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn levels(&self) -> u32 {
        self.levels
    }

    pub fn dists_per_channel(&self) -> u32 {
        self.dists_per_channel
    }

    pub fn layer_count(&self) -> u32 {
        self.levels * self.dists_per_channel
    }

    pub fn layer(&self, level: u32, dist: u32) -> u32 {
        level * self.dists_per_channel + dist
    }

    /// Path of the file holding distribution `dist` at pyramid level `level`.
    pub fn file_path(&self, dist: u32, level: u32) -> PathBuf {
        let mut name = self.base.as_os_str().to_owned();
        name.push(format!("_{dist:04}_{level:04}.exr"));
        PathBuf::from(name)
    }

    /// Every file of the dictionary, ordered by layer.
    pub fn entries(&self) -> impl Iterator<Item = DictionaryEntry> + '_ {
        (0..self.levels).flat_map(move |level| {
            (0..self.dists_per_channel).map(move |dist| DictionaryEntry {
                dist,
                level,
                layer: self.layer(level, dist),
                path: self.file_path(dist, level),
            })
        })
    }

    pub fn params(&self) -> DictionaryParams {
        DictionaryParams {
            alpha: Self::ALPHA,
            n: (self.dists_per_channel * 3) as i32,
            n_levels: self.levels as i32,
            pyramid0_size: 1 << (self.levels - 1),
        }
    }

    /// Decodes every file and packs them into one array.
    ///
    /// Files are decoded in parallel. Any file that fails to decode, or whose width differs from
    /// the first file's, fails the whole load.
    pub fn load(&self) -> Result<DistributionArray, DictionaryError> {
        let start = std::time::Instant::now();
        let entries = self.entries().collect::<Vec<_>>();
        let rows = entries
            .par_iter()
            .map(|entry| decode_first_row(&entry.path))
            .collect::<Result<Vec<_>, _>>()?;

        let width = rows.first().map_or(0, |(width, _)| *width);
        let mut texels = Vec::with_capacity(width as usize * 4 * rows.len());
        for (entry, (row_width, row)) in entries.iter().zip(rows) {
            if row_width != width {
                return Err(DictionaryError::WidthMismatch {
                    path: entry.path.clone(),
                    expected: width,
                    found: row_width,
                });
            }
            texels.extend_from_slice(&row);
        }

        log::info!(
            "Loaded {} dictionary distributions of width {} in {:?}",
            entries.len(),
            width,
            start.elapsed()
        );

        Ok(DistributionArray {
            width,
            layers: self.layer_count(),
            texels,
        })
    }
}

/// A decoded dictionary: `layers` rows of `width` RGBA texels each.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionArray {
    pub width: u32,
    pub layers: u32,
    pub texels: Vec<f32>,
}

impl DistributionArray {
    /// The RGBA texels of one layer.
    pub fn layer(&self, layer: u32) -> &[f32] {
        let row = self.width as usize * 4;
        let start = layer as usize * row;
        &self.texels[start..start + row]
    }
}

fn decode_first_row(path: &Path) -> Result<(u32, Vec<f32>), DictionaryError> {
    let image = image::open(path)
        .map_err(|source| DictionaryError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba32f();
    let width = image.width();
    if width == 0 || image.height() == 0 {
        return Err(DictionaryError::EmptyImage {
            path: path.to_path_buf(),
        });
    }
    Ok((width, image.as_raw()[..width as usize * 4].to_vec()))
}
