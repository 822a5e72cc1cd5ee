// SPDX-License-Identifier: GPL-3.0-only

//! Owning arena for the whole hierarchy.
//!
//! Objects refer to each other through typed IDs only. The registry is the
//! single owner; cascades look objects up by ID instead of following pointers.

use std::collections::HashMap;

use volmgr_contracts::StateError;
use volmgr_types::{
    ConfigDescription, DriveDesc, DriveId, DriveState, ObjectKind, ObjectRef, PlexDesc, PlexId,
    PlexOrganization, PlexState, SubdiskDesc, SubdiskId, SubdiskState, VolumeDesc, VolumeId,
    VolumeState,
};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone)]
pub struct Drive {
    pub(crate) name: String,
    pub(crate) device: String,
    pub(crate) state: DriveState,
    pub(crate) subdisks: Vec<SubdiskId>,
}

impl Drive {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn state(&self) -> DriveState {
        self.state
    }

    pub fn subdisks(&self) -> &[SubdiskId] {
        &self.subdisks
    }
}

#[derive(Debug, Clone)]
pub struct Subdisk {
    pub(crate) name: String,
    pub(crate) state: SubdiskState,
    /// Set at creation, cleared by the first transition to up.
    pub(crate) newborn: bool,
    pub(crate) drive: DriveId,
    pub(crate) plex: Option<PlexId>,
}

impl Subdisk {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SubdiskState {
        self.state
    }

    pub fn is_newborn(&self) -> bool {
        self.newborn
    }

    pub fn drive(&self) -> DriveId {
        self.drive
    }

    pub fn plex(&self) -> Option<PlexId> {
        self.plex
    }
}

#[derive(Debug, Clone)]
pub struct Plex {
    pub(crate) name: String,
    pub(crate) organization: PlexOrganization,
    pub(crate) state: PlexState,
    pub(crate) down_count: usize,
    pub(crate) syncing: bool,
    pub(crate) subdisks: Vec<SubdiskId>,
    pub(crate) volume: Option<VolumeId>,
}

impl Plex {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn organization(&self) -> PlexOrganization {
        self.organization
    }

    pub fn state(&self) -> PlexState {
        self.state
    }

    /// Members currently in down, stale or reviving.
    pub fn down_count(&self) -> usize {
        self.down_count
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing
    }

    pub fn subdisks(&self) -> &[SubdiskId] {
        &self.subdisks
    }

    pub fn volume(&self) -> Option<VolumeId> {
        self.volume
    }
}

#[derive(Debug, Clone)]
pub struct Volume {
    pub(crate) name: String,
    pub(crate) state: VolumeState,
    pub(crate) plexes: Vec<PlexId>,
}

impl Volume {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> VolumeState {
        self.state
    }

    pub fn plexes(&self) -> &[PlexId] {
        &self.plexes
    }
}

/// The in-memory configuration graph.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    pub(crate) drives: Vec<Drive>,
    pub(crate) subdisks: Vec<Subdisk>,
    pub(crate) plexes: Vec<Plex>,
    pub(crate) volumes: Vec<Volume>,
    names: HashMap<String, ObjectRef>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drive(&self, id: DriveId) -> Option<&Drive> {
        self.drives.get(id.index())
    }

    pub fn subdisk(&self, id: SubdiskId) -> Option<&Subdisk> {
        self.subdisks.get(id.index())
    }

    pub fn plex(&self, id: PlexId) -> Option<&Plex> {
        self.plexes.get(id.index())
    }

    pub fn volume(&self, id: VolumeId) -> Option<&Volume> {
        self.volumes.get(id.index())
    }

    pub fn drives(&self) -> impl Iterator<Item = (DriveId, &Drive)> {
        self.drives
            .iter()
            .enumerate()
            .map(|(index, drive)| (DriveId::from_index(index), drive))
    }

    pub fn subdisks(&self) -> impl Iterator<Item = (SubdiskId, &Subdisk)> {
        self.subdisks
            .iter()
            .enumerate()
            .map(|(index, subdisk)| (SubdiskId::from_index(index), subdisk))
    }

    pub fn plexes(&self) -> impl Iterator<Item = (PlexId, &Plex)> {
        self.plexes
            .iter()
            .enumerate()
            .map(|(index, plex)| (PlexId::from_index(index), plex))
    }

    pub fn volumes(&self) -> impl Iterator<Item = (VolumeId, &Volume)> {
        self.volumes
            .iter()
            .enumerate()
            .map(|(index, volume)| (VolumeId::from_index(index), volume))
    }

    /// Resolve an object name of any kind.
    pub fn resolve(&self, name: &str) -> std::result::Result<ObjectRef, StateError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| StateError::not_found(name))
    }

    fn lookup(&self, name: &str) -> Option<ObjectRef> {
        self.names.get(name).copied()
    }

    fn claim_name(&mut self, name: &str, object: ObjectRef) -> Result<()> {
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.names.contains_key(name) {
            return Err(ConfigError::DuplicateName(name.to_string()));
        }
        self.names.insert(name.to_string(), object);
        Ok(())
    }

    pub fn add_drive(&mut self, name: &str, device: &str, state: DriveState) -> Result<DriveId> {
        let id = DriveId::try_from_index(self.drives.len())
            .ok_or(ConfigError::CapacityExceeded(ObjectKind::Drive))?;
        self.claim_name(name, ObjectRef::Drive(id))?;
        self.drives.push(Drive {
            name: name.to_string(),
            device: device.to_string(),
            state,
            subdisks: Vec::new(),
        });

        tracing::debug!("Added drive {name} ({device}) in state {state}");
        Ok(id)
    }

    pub fn add_volume(&mut self, name: &str) -> Result<VolumeId> {
        let id = VolumeId::try_from_index(self.volumes.len())
            .ok_or(ConfigError::CapacityExceeded(ObjectKind::Volume))?;
        self.claim_name(name, ObjectRef::Volume(id))?;
        self.volumes.push(Volume {
            name: name.to_string(),
            state: VolumeState::Down,
            plexes: Vec::new(),
        });

        tracing::debug!("Added volume {name}");
        Ok(id)
    }

    pub fn add_plex(
        &mut self,
        name: &str,
        organization: PlexOrganization,
        volume: Option<VolumeId>,
    ) -> Result<PlexId> {
        if let Some(volume_id) = volume
            && self.volume(volume_id).is_none()
        {
            return Err(ConfigError::UnknownReference {
                kind: ObjectKind::Plex,
                name: name.to_string(),
                target_kind: ObjectKind::Volume,
                target: format!("#{}", volume_id.index()),
            });
        }

        let id = PlexId::try_from_index(self.plexes.len())
            .ok_or(ConfigError::CapacityExceeded(ObjectKind::Plex))?;
        self.claim_name(name, ObjectRef::Plex(id))?;
        self.plexes.push(Plex {
            name: name.to_string(),
            organization,
            state: PlexState::Down,
            down_count: 0,
            syncing: false,
            subdisks: Vec::new(),
            volume,
        });

        if let Some(volume_id) = volume {
            self.volumes[volume_id.index()].plexes.push(id);
        }

        tracing::debug!("Added {organization} plex {name}");
        self.recompute_plex(id);
        if let Some(volume_id) = volume {
            self.recompute_volume(volume_id);
        }
        Ok(id)
    }

    /// Define a subdisk on `drive`, optionally placed at the end of `plex`.
    ///
    /// Without an explicit state the subdisk is newborn and takes whatever
    /// its drive allows. Any explicit state on a down drive is recorded as down.
    pub fn add_subdisk(
        &mut self,
        name: &str,
        drive: DriveId,
        plex: Option<PlexId>,
        state: Option<SubdiskState>,
    ) -> Result<SubdiskId> {
        let unknown = |target_kind, target: usize| ConfigError::UnknownReference {
            kind: ObjectKind::Subdisk,
            name: name.to_string(),
            target_kind,
            target: format!("#{target}"),
        };
        if self.drive(drive).is_none() {
            return Err(unknown(ObjectKind::Drive, drive.index()));
        }
        if let Some(plex_id) = plex
            && self.plex(plex_id).is_none()
        {
            return Err(unknown(ObjectKind::Plex, plex_id.index()));
        }

        let id = SubdiskId::try_from_index(self.subdisks.len())
            .ok_or(ConfigError::CapacityExceeded(ObjectKind::Subdisk))?;
        self.claim_name(name, ObjectRef::Subdisk(id))?;

        let drive_up = self.drives[drive.index()].state == DriveState::Up;
        let recorded = state.map(|state| if drive_up { state } else { SubdiskState::Down });

        self.subdisks.push(Subdisk {
            name: name.to_string(),
            state: recorded.unwrap_or(SubdiskState::Down),
            newborn: recorded.is_none(),
            drive,
            plex,
        });
        self.drives[drive.index()].subdisks.push(id);
        if let Some(plex_id) = plex {
            self.plexes[plex_id.index()].subdisks.push(id);
        }

        tracing::debug!("Added subdisk {name} on drive {}", self.drives[drive.index()].name);
        if recorded.is_none() {
            self.update_subdisk_from_drive(id);
        } else if let Some(plex_id) = plex {
            self.recompute_plex(plex_id);
        }
        Ok(id)
    }

    /// Rebuild a configuration from its description.
    ///
    /// Derived plex and volume states in the description are ignored.
    pub fn from_description(description: &ConfigDescription) -> Result<Self> {
        let mut config = Self::new();

        for drive in &description.drives {
            config.add_drive(&drive.name, &drive.device, drive.state)?;
        }

        for volume in &description.volumes {
            config.add_volume(&volume.name)?;
        }

        for plex in &description.plexes {
            let volume = match plex.volume.as_deref() {
                Some(volume_name) => Some(config.volume_id_for(
                    ObjectKind::Plex,
                    &plex.name,
                    volume_name,
                )?),
                None => None,
            };
            let id = config.add_plex(&plex.name, plex.organization, volume)?;
            if plex.syncing {
                config.set_plex_syncing(id, true);
            }
        }

        for subdisk in &description.subdisks {
            let drive = match config.lookup(&subdisk.drive) {
                Some(ObjectRef::Drive(id)) => id,
                _ => {
                    return Err(ConfigError::UnknownReference {
                        kind: ObjectKind::Subdisk,
                        name: subdisk.name.clone(),
                        target_kind: ObjectKind::Drive,
                        target: subdisk.drive.clone(),
                    });
                }
            };
            let plex = match subdisk.plex.as_deref() {
                Some(plex_name) => match config.lookup(plex_name) {
                    Some(ObjectRef::Plex(id)) => Some(id),
                    _ => {
                        return Err(ConfigError::UnknownReference {
                            kind: ObjectKind::Subdisk,
                            name: subdisk.name.clone(),
                            target_kind: ObjectKind::Plex,
                            target: plex_name.to_string(),
                        });
                    }
                },
                None => None,
            };
            config.add_subdisk(&subdisk.name, drive, plex, subdisk.state)?;
        }

        Ok(config)
    }

    fn volume_id_for(&self, kind: ObjectKind, name: &str, volume_name: &str) -> Result<VolumeId> {
        match self.lookup(volume_name) {
            Some(ObjectRef::Volume(id)) => Ok(id),
            _ => Err(ConfigError::UnknownReference {
                kind,
                name: name.to_string(),
                target_kind: ObjectKind::Volume,
                target: volume_name.to_string(),
            }),
        }
    }

    /// Describe the whole graph, derived states included. Newborn subdisks
    /// are written without a state.
    pub fn describe(&self) -> ConfigDescription {
        ConfigDescription {
            saved_at: None,
            drives: self
                .drives
                .iter()
                .map(|drive| DriveDesc {
                    name: drive.name.clone(),
                    device: drive.device.clone(),
                    state: drive.state,
                })
                .collect(),
            volumes: self
                .volumes
                .iter()
                .map(|volume| VolumeDesc {
                    name: volume.name.clone(),
                    state: Some(volume.state),
                })
                .collect(),
            plexes: self
                .plexes
                .iter()
                .map(|plex| PlexDesc {
                    name: plex.name.clone(),
                    organization: plex.organization,
                    volume: plex
                        .volume
                        .map(|volume| self.volumes[volume.index()].name.clone()),
                    syncing: plex.syncing,
                    state: Some(plex.state),
                })
                .collect(),
            subdisks: self
                .subdisks
                .iter()
                .map(|subdisk| SubdiskDesc {
                    name: subdisk.name.clone(),
                    drive: self.drives[subdisk.drive.index()].name.clone(),
                    plex: subdisk
                        .plex
                        .map(|plex| self.plexes[plex.index()].name.clone()),
                    // A newborn still follows its drive after a reload.
                    state: (!subdisk.newborn).then_some(subdisk.state),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_description() -> ConfigDescription {
        let raw = r#"
[[drive]]
name = "d0"
device = "/dev/sdb"
state = "up"

[[drive]]
name = "d1"
device = "/dev/sdc"
state = "down"

[[volume]]
name = "vol0"

[[plex]]
name = "vol0.p0"
organization = "concat"
volume = "vol0"

[[subdisk]]
name = "vol0.p0.s0"
drive = "d0"
plex = "vol0.p0"

[[subdisk]]
name = "vol0.p0.s1"
drive = "d1"
plex = "vol0.p0"
state = "up"
"#;
        toml::from_str(raw).expect("parse sample")
    }

    #[test]
    fn names_are_unique_across_kinds() {
        let mut config = Configuration::new();
        config
            .add_drive("shared", "/dev/sdb", DriveState::Up)
            .expect("add drive");

        assert_eq!(
            config.add_volume("shared"),
            Err(ConfigError::DuplicateName("shared".to_string()))
        );
        assert_eq!(config.add_volume("  "), Err(ConfigError::EmptyName));
    }

    #[test]
    fn resolve_reports_missing_names() {
        let config = Configuration::new();
        let error = config.resolve("nope").expect_err("missing name");
        assert_eq!(error.kind, volmgr_contracts::StateErrorKind::ObjectNotFound);
    }

    #[test]
    fn newborn_subdisk_follows_its_drive() {
        let mut config = Configuration::new();
        let up = config.add_drive("d0", "/dev/sdb", DriveState::Up).expect("add");
        let down = config.add_drive("d1", "/dev/sdc", DriveState::Down).expect("add");

        let a = config.add_subdisk("a", up, None, None).expect("add a");
        let b = config.add_subdisk("b", down, None, None).expect("add b");

        let a = config.subdisk(a).expect("a");
        assert_eq!(a.state(), SubdiskState::Up);
        assert!(!a.is_newborn());

        let b = config.subdisk(b).expect("b");
        assert_eq!(b.state(), SubdiskState::Down);
        assert!(b.is_newborn());
    }

    #[test]
    fn recorded_up_on_a_down_drive_is_kept_down() {
        let config = Configuration::from_description(&sample_description()).expect("load");

        let ObjectRef::Subdisk(id) = config.resolve("vol0.p0.s1").expect("resolve") else {
            panic!("expected a subdisk");
        };
        assert_eq!(config.subdisk(id).expect("sd").state(), SubdiskState::Down);
    }

    #[test]
    fn loading_recomputes_derived_states() {
        let mut description = sample_description();
        description.plexes[0].state = Some(PlexState::Up);
        description.volumes[0].state = Some(VolumeState::Up);

        let config = Configuration::from_description(&description).expect("load");
        let ObjectRef::Plex(plex) = config.resolve("vol0.p0").expect("resolve") else {
            panic!("expected a plex");
        };
        let plex = config.plex(plex).expect("plex");

        assert_eq!(plex.state(), PlexState::Down);
        assert_eq!(plex.down_count(), 1);
        let volume = config.volume(plex.volume().expect("volume")).expect("volume");
        assert_eq!(volume.state(), VolumeState::Down);
    }

    #[test]
    fn unknown_references_are_rejected() {
        let mut description = sample_description();
        description.subdisks[0].drive = "d9".to_string();

        let error = Configuration::from_description(&description).expect_err("dangling drive");
        assert_eq!(
            error,
            ConfigError::UnknownReference {
                kind: ObjectKind::Subdisk,
                name: "vol0.p0.s0".to_string(),
                target_kind: ObjectKind::Drive,
                target: "d9".to_string(),
            }
        );
    }

    #[test]
    fn describe_preserves_member_order_and_states() {
        let config = Configuration::from_description(&sample_description()).expect("load");
        let description = config.describe();

        let names: Vec<_> = description
            .subdisks
            .iter()
            .map(|subdisk| subdisk.name.as_str())
            .collect();
        assert_eq!(names, vec!["vol0.p0.s0", "vol0.p0.s1"]);
        assert_eq!(description.subdisks[0].state, Some(SubdiskState::Up));
        assert_eq!(description.plexes[0].state, Some(PlexState::Down));
        assert_eq!(description.plexes[0].volume.as_deref(), Some("vol0"));

        let reloaded = Configuration::from_description(&description).expect("reload");
        assert_eq!(reloaded.describe(), description);
    }

    #[test]
    fn newborn_subdisk_survives_a_reload() {
        let mut config = Configuration::new();
        let drive = config.add_drive("d0", "/dev/sdb", DriveState::Down).expect("d0");
        config.add_subdisk("s0", drive, None, None).expect("s0");

        let description = config.describe();
        assert_eq!(description.subdisks[0].state, None);

        let mut reloaded = Configuration::from_description(&description).expect("reload");
        let ObjectRef::Subdisk(id) = reloaded.resolve("s0").expect("resolve") else {
            panic!("expected a subdisk");
        };
        let subdisk = reloaded.subdisk(id).expect("s0");
        assert_eq!(subdisk.state(), SubdiskState::Down);
        assert!(subdisk.is_newborn());

        let ObjectRef::Drive(drive) = reloaded.resolve("d0").expect("resolve") else {
            panic!("expected a drive");
        };
        reloaded
            .set_drive_state(
                drive,
                DriveState::Up,
                volmgr_types::StateFlags::empty(),
                &volmgr_contracts::NeverOpen,
            )
            .expect("drive up");

        let subdisk = reloaded.subdisk(id).expect("s0");
        assert_eq!(subdisk.state(), SubdiskState::Up);
        assert!(!subdisk.is_newborn());
        assert_eq!(reloaded.describe().subdisks[0].state, Some(SubdiskState::Up));
    }
}
