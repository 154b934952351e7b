//! The `run` command: compile the plan, reconcile networks and boot the
//! hypervisor.

use super::{execv, prepare};
use crate::cli::VmArgs;
use anyhow::Result;
use qemuctl_core::{ensure_network, Error, Video};

pub fn run(args: &VmArgs) -> Result<()> {
    let ec = prepare(args)?;

    std::fs::create_dir_all(&ec.runtime_dir)?;

    let mut qemu_args: Vec<String> = vec![
        "-name".into(),
        ec.config.name.clone(),
        "-nodefaults".into(),
        "-no-user-config".into(),
        "-no-hpet".into(),
        "-machine".into(),
        "q35,accel=kvm,vmport=off,dump-guest-core=off".into(),
    ];

    if ec.uses_uefi() {
        // Firmware installation is out of scope; the image must already be
        // in place.
        if !ec.firmware_file.exists() {
            return Err(Error::RuntimeState(format!(
                "UEFI firmware image missing, install one at {}",
                ec.firmware_file.display()
            ))
            .into());
        }
        qemu_args.push("-bios".into());
        qemu_args.push(ec.firmware_file.display().to_string());
    }

    let cpu = &ec.config.cpu;
    qemu_args.extend([
        "-cpu".into(),
        "host".into(),
        "-smp".into(),
        format!(
            "{},sockets={},cores={},threads={}",
            cpu.total(),
            cpu.sockets,
            cpu.cores,
            cpu.threads
        ),
        "-m".into(),
        ec.config.memory.to_string(),
        "-chardev".into(),
        format!(
            "socket,id=char0,path={},server,nowait",
            ec.console_sock.display()
        ),
        "-device".into(),
        "isa-serial,chardev=char0".into(),
        "-chardev".into(),
        format!(
            "socket,id=char1,path={},server,nowait",
            ec.monitor_sock.display()
        ),
        "-mon".into(),
        "chardev=char1".into(),
        "-object".into(),
        "rng-random,id=obj0,filename=/dev/urandom".into(),
        "-device".into(),
        "virtio-rng-pci,rng=obj0".into(),
        "-device".into(),
        "virtio-balloon-pci".into(),
        "-pidfile".into(),
        ec.pid_file.display().to_string(),
        "-daemonize".into(),
    ]);

    let mut boot_index = 0u32;
    let mut boot_order = String::new();

    if let Some(iso) = &ec.config.iso {
        qemu_args.extend([
            "-drive".into(),
            format!("id=drive0,if=none,format=raw,file={}", iso.display()),
            "-device".into(),
            format!("ide-cd,drive=drive0,bus=ide.1,bootindex={boot_index}"),
        ]);
        boot_index += 1;
        boot_order.push('c');
    }

    if !ec.config.disks.is_empty() {
        for (i, disk) in ec.config.disks.iter().enumerate() {
            qemu_args.extend([
                "-blockdev".into(),
                format!(
                    "qcow2,node-name=block{i},file.driver=file,file.filename={}",
                    disk.display()
                ),
                "-device".into(),
                format!("virtio-blk-pci,drive=block{i},bootindex={boot_index}"),
            ]);
            boot_index += 1;
        }
        boot_order.push('d');
    }

    for (i, net) in ec.networks.iter().enumerate() {
        ensure_network(&ec.programs.virsh.path, net)?;
        qemu_args.extend([
            "-netdev".into(),
            format!("bridge,id=net{i},br={}", net.bridge_dev),
            "-device".into(),
            format!("virtio-net-pci,netdev=net{i},mac={}", net.mac),
        ]);
    }

    if ec.config.video == Video::None {
        qemu_args.push("-nographic".into());
    } else {
        qemu_args.extend([
            "-device".into(),
            "ich9-usb-ehci1,id=usb".into(),
            "-device".into(),
            "ich9-usb-uhci1,masterbus=usb.0,firstport=0,multifunction=on".into(),
            "-device".into(),
            "ich9-usb-uhci2,masterbus=usb.0,firstport=2".into(),
            "-device".into(),
            "ich9-usb-uhci3,masterbus=usb.0,firstport=4".into(),
            "-device".into(),
            "usb-tablet".into(),
        ]);

        match ec.config.video {
            Video::Qxl => qemu_args.extend([
                "-device".into(),
                "qxl-vga,vgamem_mb=64,max_outputs=1".into(),
                "-spice".into(),
                format!(
                    "addr={},unix,disable-ticketing,image-compression=off,seamless-migration=on",
                    ec.display_sock.display()
                ),
                "-chardev".into(),
                "spicevmc,id=char2,debug=0,name=vdagent".into(),
                "-device".into(),
                "virtio-serial-pci".into(),
                "-device".into(),
                "virtserialport,chardev=char2,name=com.redhat.spice.0".into(),
            ]),
            Video::Vga => qemu_args.extend(["-device".into(), "VGA,vgamem_mb=64".into()]),
            Video::Virtio => qemu_args.extend(["-device".into(), "virtio-gpu-pci".into()]),
            Video::None => {}
        }
    }

    if boot_index > 0 {
        let menu = if boot_index > 1 { "on" } else { "off" };
        qemu_args.push("-boot".into());
        qemu_args.push(format!("order={boot_order},menu={menu}"));
    }

    execv(args.dry_run, &ec.programs.hypervisor, &qemu_args)
}
