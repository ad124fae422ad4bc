//! Dataset kinds and the meta-type tables used to tag their files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DataSetError;

/// Meta type of a scraps BAM attached to a subreads BAM.
pub const SCRAPS_META_TYPE: &str = "PacBio.SubreadFile.ScrapsBamFile";
/// Meta type of a control-reads BAM attached to a subreads BAM.
pub const CONTROL_META_TYPE: &str = "PacBio.SubreadFile.Control.SubreadBamFile";
/// Meta type of a chip statistics (`.sts.xml`) file.
pub const STS_META_TYPE: &str = "PacBio.SubreadFile.ChipStatsFile";

/// Index meta types, longest suffix first so `.contig.index` wins over `.index`.
const INDEX_META_TYPES: [(&str, &str); 7] = [
    (".metadata.xml", "PacBio.Index.MetadataXmlIndex"),
    (".contig.index", "PacBio.Index.FastaContigIndex"),
    (".index", "PacBio.Index.Indexer"),
    (".pbi", "PacBio.Index.PacBioIndex"),
    (".bai", "PacBio.Index.BamIndex"),
    (".fai", "PacBio.Index.SamIndex"),
    (".sa", "PacBio.Index.SaWriterIndex"),
];

/// Suffixes whose meta type does not depend on the dataset kind.
const UNIVERSAL_META_TYPES: [(&str, &str); 5] = [
    (".scraps.bam", SCRAPS_META_TYPE),
    (".subreads.bam", "PacBio.SubreadFile.SubreadBamFile"),
    (".ccs.bam", "PacBio.ConsensusReadFile.ConsensusReadBamFile"),
    (".sts.xml", STS_META_TYPE),
    (".bax.h5", "PacBio.SubreadFile.BaxFile"),
];

/// The concrete type of a dataset.
///
/// Every node of a parsed dataset tree shares the kind of its root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataSetKind {
    #[default]
    DataSet,
    SubreadSet,
    HdfSubreadSet,
    AlignmentSet,
    ConsensusReadSet,
    ConsensusAlignmentSet,
    ReferenceSet,
    ContigSet,
    BarcodeSet,
    TranscriptSet,
}

impl DataSetKind {
    pub const ALL: [DataSetKind; 10] = [
        DataSetKind::DataSet,
        DataSetKind::SubreadSet,
        DataSetKind::HdfSubreadSet,
        DataSetKind::AlignmentSet,
        DataSetKind::ConsensusReadSet,
        DataSetKind::ConsensusAlignmentSet,
        DataSetKind::ReferenceSet,
        DataSetKind::ContigSet,
        DataSetKind::BarcodeSet,
        DataSetKind::TranscriptSet,
    ];

    /// XML root element name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            DataSetKind::DataSet => "DataSet",
            DataSetKind::SubreadSet => "SubreadSet",
            DataSetKind::HdfSubreadSet => "HdfSubreadSet",
            DataSetKind::AlignmentSet => "AlignmentSet",
            DataSetKind::ConsensusReadSet => "ConsensusReadSet",
            DataSetKind::ConsensusAlignmentSet => "ConsensusAlignmentSet",
            DataSetKind::ReferenceSet => "ReferenceSet",
            DataSetKind::ContigSet => "ContigSet",
            DataSetKind::BarcodeSet => "BarcodeSet",
            DataSetKind::TranscriptSet => "TranscriptSet",
        }
    }

    /// The `MetaType` attribute value for datasets of this kind.
    pub fn meta_type(&self) -> String {
        format!("PacBio.DataSet.{}", self.name())
    }

    /// Looks up a kind by the local name of a dataset XML root element.
    pub fn from_root_tag(local_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == local_name)
    }

    /// Meta type for a primary resource file of this kind.
    ///
    /// Kind-independent suffixes (subreads, scraps, ccs, sts) are checked
    /// first; then the primary file extension for the kind.
    pub fn resource_meta_type(&self, path: &str) -> Option<&'static str> {
        if let Some((_, meta_type)) = UNIVERSAL_META_TYPES
            .iter()
            .find(|(suffix, _)| path.ends_with(suffix))
        {
            return Some(*meta_type);
        }

        let is_bam = path.ends_with(".bam");
        let is_fasta = [".fasta", ".fa", ".fna"]
            .iter()
            .any(|suffix| path.ends_with(suffix));

        match self {
            DataSetKind::SubreadSet if is_bam => Some("PacBio.SubreadFile.SubreadBamFile"),
            DataSetKind::AlignmentSet if is_bam => Some("PacBio.AlignmentFile.AlignmentBamFile"),
            DataSetKind::ConsensusReadSet if is_bam => {
                Some("PacBio.ConsensusReadFile.ConsensusReadBamFile")
            }
            DataSetKind::ConsensusAlignmentSet if is_bam => {
                Some("PacBio.AlignmentFile.ConsensusAlignmentBamFile")
            }
            DataSetKind::TranscriptSet if is_bam => Some("PacBio.TranscriptFile.TranscriptBamFile"),
            DataSetKind::HdfSubreadSet if path.ends_with(".h5") => {
                Some("PacBio.SubreadFile.BaxFile")
            }
            DataSetKind::ReferenceSet if is_fasta => Some("PacBio.ReferenceFile.ReferenceFastaFile"),
            DataSetKind::ContigSet if is_fasta => Some("PacBio.ContigFile.ContigFastaFile"),
            DataSetKind::BarcodeSet if is_fasta => Some("PacBio.BarcodeFile.BarcodeFastaFile"),
            _ => None,
        }
    }
}

/// Meta type for a companion index file, by suffix.
pub fn index_meta_type(path: &str) -> Option<&'static str> {
    INDEX_META_TYPES
        .iter()
        .find(|(suffix, _)| path.ends_with(suffix))
        .map(|(_, meta_type)| *meta_type)
}

impl fmt::Display for DataSetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataSetKind {
    type Err = DataSetError;

    /// Accepts the root element name in any case, with or without the
    /// trailing `Set` (`subreadset`, `SubreadSet`, `subread`).
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| {
                let name = kind.name().to_ascii_lowercase();
                name == wanted || name.strip_suffix("set") == Some(wanted.as_str())
            })
            .ok_or_else(|| DataSetError::UnknownDataSetKind(raw.to_string()))
    }
}
