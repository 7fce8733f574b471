//! crash-safe file output. every write lands in a sibling `.tmp` with
//! restrictive permissions and is renamed into place, so a torn write
//! can never clobber a good file.

use crate::genome::Genome;
use anyhow::Context;
use anyhow::Result;
use std::io::Write;
use std::path::Path;

pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    {
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&tmp)
            .with_context(|| format!("create {}", tmp.display()))?;
        file.write_all(bytes)
            .with_context(|| format!("write {}", tmp.display()))?;
        file.sync_all()
            .with_context(|| format!("sync {}", tmp.display()))?;
    }
    std::fs::rename(&tmp, path)
        .with_context(|| format!("rename {} into {}", tmp.display(), path.display()))
}

pub fn write_genome(path: &Path, genome: &Genome) -> Result<()> {
    write_atomic(path, genome.to_json_pretty().as_bytes())
}

/// dump the top performers as individual pretty JSON files
pub fn export_genomes(dir: &Path, genomes: &[&Genome]) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    for (i, genome) in genomes.iter().enumerate() {
        let slug: String = genome
            .name
            .chars()
            .map(|c| match c.is_ascii_alphanumeric() {
                true => c.to_ascii_lowercase(),
                false => '_',
            })
            .collect();
        let path = dir.join(format!("{:02}_{}.json", i + 1, slug));
        write_genome(&path, genome)?;
    }
    Ok(())
}
