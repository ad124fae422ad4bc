#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub const DATASETS_NS: &str = "http://pacificbiosciences.com/PacBioDatasets.xsd";
pub const BASE_NS: &str = "http://pacificbiosciences.com/PacBioBaseDataModel.xsd";

/// Legacy statistics: bins stored directly under their distribution.
pub const LEGACY_STS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<PipeStats xmlns="http://pacificbiosciences.com/PipelineStats/PipeStats.xsd">
  <NumSequencingZmws>150292</NumSequencingZmws>
  <ProdDist>
    <NumBins>4</NumBins>
    <BinCount>1576</BinCount>
    <BinCount>901</BinCount>
    <BinCount>0</BinCount>
    <BinCount>0</BinCount>
    <MetricDescription>Productivity</MetricDescription>
    <BinLabel>Empty</BinLabel>
    <BinLabel>Productive</BinLabel>
    <BinLabel>Other</BinLabel>
    <BinLabel>NotDefined</BinLabel>
  </ProdDist>
  <ReadLenDist>
    <SampleSize>901</SampleSize>
    <NumBins>3</NumBins>
    <BinCount>10</BinCount>
    <BinCount>20</BinCount>
    <BinCount>30</BinCount>
  </ReadLenDist>
</PipeStats>
"#;

/// Current statistics layout, compatible with [`LEGACY_STS`] once upgraded.
pub const CURRENT_STS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<PipeStats xmlns="http://pacificbiosciences.com/PipelineStats/PipeStats.xsd">
  <NumSequencingZmws>100</NumSequencingZmws>
  <ReadLenDist>
    <SampleSize>60</SampleSize>
    <NumBins>3</NumBins>
    <BinCounts>
      <BinCount>1</BinCount>
      <BinCount>2</BinCount>
      <BinCount>3</BinCount>
    </BinCounts>
  </ReadLenDist>
</PipeStats>
"#;

pub fn touch(path: &Path) {
    write_file(path, "");
}

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write file");
}

/// Renders a SubreadSet XML document referencing `resources`.
///
/// Each entry is `(resource_id, sts)`; `sts` is attached as a
/// ChipStatsFile sub-resource when present.
pub fn subreadset_xml(name: &str, resources: &[(&str, Option<&str>)], num_records: u64) -> String {
    let mut external = String::new();
    for (resource_id, sts) in resources {
        match sts {
            Some(sts) => external.push_str(&format!(
                r#"    <pbbase:ExternalResource ResourceId="{resource_id}" MetaType="PacBio.SubreadFile.SubreadBamFile">
      <pbbase:ExternalResources>
        <pbbase:ExternalResource ResourceId="{sts}" MetaType="PacBio.SubreadFile.ChipStatsFile"/>
      </pbbase:ExternalResources>
    </pbbase:ExternalResource>
"#
            )),
            None => external.push_str(&format!(
                "    <pbbase:ExternalResource ResourceId=\"{resource_id}\"/>\n"
            )),
        }
    }

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<pbds:SubreadSet xmlns:pbds="{DATASETS_NS}" xmlns:pbbase="{BASE_NS}"
    Name="{name}" MetaType="PacBio.DataSet.SubreadSet">
  <pbbase:ExternalResources>
{external}  </pbbase:ExternalResources>
  <pbds:DataSetMetadata>
    <pbds:TotalLength>{total}</pbds:TotalLength>
    <pbds:NumRecords>{num_records}</pbds:NumRecords>
  </pbds:DataSetMetadata>
</pbds:SubreadSet>
"#,
        total = num_records * 100,
    )
}

pub fn write_subreadset(path: &Path, name: &str, resources: &[(&str, Option<&str>)], num_records: u64) {
    write_file(path, &subreadset_xml(name, resources, num_records));
}
