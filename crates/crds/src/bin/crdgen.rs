//! Prints the ARK CRD manifests as YAML.
//!
//! ```sh
//! cargo run -p crds --bin crdgen > config/crd/queries.yaml
//! ```

use crds::Query;
use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    print!("{}", serde_yaml::to_string(&Query::crd())?);
    Ok(())
}
